use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: i64,
    pub text: String,
    #[serde(default)]
    pub options: Vec<QuestionOption>,
    #[serde(default)]
    pub multiple_choice: bool, // more than one option may be selected
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionOption {
    pub id: i64,
    #[serde(default)]
    pub text: String,
}

impl Question {
    pub fn has_option(&self, option_id: i64) -> bool {
        self.options.iter().any(|o| o.id == option_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_tolerates_missing_option_text() {
        let json = r#"{"id": 1, "text": "Pick one", "options": [{"id": 10}, {"id": 11, "text": "B"}]}"#;
        let question: Question = serde_json::from_str(json).expect("question should deserialize");

        assert_eq!(question.options.len(), 2);
        assert_eq!(question.options[0].text, "");
        assert!(!question.multiple_choice);
        assert!(question.has_option(11));
        assert!(!question.has_option(12));
    }
}
