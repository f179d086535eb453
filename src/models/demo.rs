//! Fixed question set used when the generator cannot be reached.
use super::{Answer, Question};

pub fn demo_questions() -> Vec<Question> {
    vec![
        Question::new(
            "Какая планета самая большая в Солнечной системе?",
            vec![
                Answer::new("Земля", false),
                Answer::new("Юпитер", true),
                Answer::new("Сатурн", false),
                Answer::new("Марс", false),
            ],
        )
        .with_explanation(
            "Юпитер является самой большой планетой в Солнечной системе с массой, \
             в 318 раз превышающей массу Земли.",
        ),
        Question::new(
            "В каком году началась Первая мировая война?",
            vec![
                Answer::new("1914", true),
                Answer::new("1918", false),
                Answer::new("1939", false),
                Answer::new("1912", false),
            ],
        )
        .with_explanation(
            "Первая мировая война началась 28 июля 1914 года и продолжалась до 11 ноября 1918 года.",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::validate_questions;

    #[test]
    fn test_demo_set_is_valid() {
        let questions = demo_questions();
        assert_eq!(questions.len(), 2);
        assert!(validate_questions(&questions).is_ok());
    }
}
