//! Built-in recognizers
//!
//! | recognizer      | priority |
//! |-----------------|----------|
//! | composite       | 60       |
//! | multi_step      | 50       |
//! | currency        | 40       |
//! | calculator      | 10       |
//! | weather         | 8        |
//! | knowledge_base  | 6        |

mod calculator;
mod composite;
mod currency;
mod knowledge;
mod multi_step;
mod weather;

pub use calculator::CalculatorRecognizer;
pub use composite::CompositeRecognizer;
pub use currency::CurrencyRecognizer;
pub use knowledge::KnowledgeRecognizer;
pub use multi_step::MultiStepRecognizer;
pub use weather::WeatherRecognizer;

use super::Recognizer;

/// Built-in recognizers in registration order
pub fn default_recognizers() -> Vec<Box<dyn Recognizer>> {
    vec![
        Box::new(CompositeRecognizer),
        Box::new(MultiStepRecognizer),
        Box::new(CurrencyRecognizer),
        Box::new(CalculatorRecognizer),
        Box::new(WeatherRecognizer),
        Box::new(KnowledgeRecognizer),
    ]
}
