//! Answer validation for the interactive prompts.
use crate::errors::InvalidInput;
use crate::model::Decision;

pub const CONSENT_PROMPT: &str = "Do you consent to have your decisions saved to a file? (yes/no)";
pub const DECISION_PROMPT: &str = "Who should be saved? (passenger(s) [1] or pedestrian(s) [2])";
pub const CONTINUE_PROMPT: &str = "Would you like to continue? (yes/no)";
pub const CLOSING_MESSAGE: &str = "That's all. Press any key to quit.";

/// Whether to keep generating scenarios after a batch report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continue {
    Yes,
    No,
}

/// `yes` grants consent to persist decisions, `no` refuses it.
pub fn parse_consent(answer: &str) -> Result<bool, InvalidInput> {
    match answer {
        "yes" => Ok(true),
        "no" => Ok(false),
        _ => Err(InvalidInput::new(answer)),
    }
}

pub fn parse_decision(answer: &str) -> Result<Decision, InvalidInput> {
    match answer {
        "passenger" | "passengers" | "1" => Ok(Decision::Passengers),
        "pedestrian" | "pedestrians" | "2" => Ok(Decision::Pedestrians),
        _ => Err(InvalidInput::new(answer)),
    }
}

pub fn parse_continue(answer: &str) -> Result<Continue, InvalidInput> {
    match answer {
        "yes" => Ok(Continue::Yes),
        "no" => Ok(Continue::No),
        _ => Err(InvalidInput::new(answer)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consent_accepts_only_exact_yes_or_no() {
        assert_eq!(parse_consent("yes"), Ok(true));
        assert_eq!(parse_consent("no"), Ok(false));
        for answer in ["YES", "y", "", " yes", "maybe"] {
            assert_eq!(parse_consent(answer), Err(InvalidInput::new(answer)));
        }
    }

    #[test]
    fn decision_aliases_map_to_each_side() {
        for answer in ["1", "passenger", "passengers"] {
            assert_eq!(parse_decision(answer), Ok(Decision::Passengers));
        }
        for answer in ["2", "pedestrian", "pedestrians"] {
            assert_eq!(parse_decision(answer), Ok(Decision::Pedestrians));
        }
        for answer in ["3", "Passenger", "both", ""] {
            assert!(parse_decision(answer).is_err());
        }
    }

    #[test]
    fn continue_accepts_yes_and_no() {
        assert_eq!(parse_continue("yes"), Ok(Continue::Yes));
        assert_eq!(parse_continue("no"), Ok(Continue::No));
        assert!(parse_continue("quit").is_err());
    }
}
