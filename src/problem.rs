//! Coding-problem model
//!
//! [`ProblemSpec`] is the structured form of a generated exercise. It has
//! no lifecycle: the UI displays one and replaces it on the next
//! generation. The fallback problem keeps the UI usable when a generation
//! response cannot be parsed.

use serde::{Deserialize, Serialize};

/// Requested difficulty of a generated problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }

    /// Capitalized form, used in fallback titles.
    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "Beginner",
            Difficulty::Intermediate => "Intermediate",
            Difficulty::Advanced => "Advanced",
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One worked example attached to a problem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemExample {
    pub input: String,
    pub output: String,
    #[serde(default)]
    pub explanation: String,
}

/// A complete coding exercise as shown to the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemSpec {
    pub title: String,
    pub description: String,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub examples: Vec<ProblemExample>,
    #[serde(default)]
    pub constraints: Vec<String>,
    #[serde(default)]
    pub hints: Vec<String>,
}

impl ProblemSpec {
    /// Substitute problem when a generation response cannot be parsed.
    /// The UI must never be blocked by a malformed response, so this is
    /// returned instead of an error.
    pub fn fallback(difficulty: Difficulty) -> Self {
        Self {
            title: format!("{} Array Problem", difficulty.label()),
            description: "Find the solution to this array-based problem using optimal time \
                          and space complexity."
                .to_string(),
            difficulty,
            examples: vec![ProblemExample {
                input: "arr = [1, 2, 3, 4, 5]".to_string(),
                output: "result".to_string(),
                explanation: "Process the array according to the problem requirements."
                    .to_string(),
            }],
            constraints: vec![
                "1 <= arr.length <= 1000".to_string(),
                "Values are integers".to_string(),
            ],
            hints: vec![
                "Consider using two pointers".to_string(),
                "Think about time complexity".to_string(),
            ],
        }
    }

    /// The built-in problem shown before anything has been generated.
    pub fn default_problem() -> Self {
        Self {
            title: "Two Sum".to_string(),
            description: "Given an array of integers nums and an integer target, return \
                          indices of the two numbers such that they add up to target."
                .to_string(),
            difficulty: Difficulty::Beginner,
            examples: vec![ProblemExample {
                input: "nums = [2,7,11,15], target = 9".to_string(),
                output: "[0,1]".to_string(),
                explanation: "Because nums[0] + nums[1] == 9, we return [0, 1].".to_string(),
            }],
            constraints: Vec::new(),
            hints: Vec::new(),
        }
    }
}
