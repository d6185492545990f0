//! Supported submission languages
//!
//! Each language carries the container image it runs in, the source file
//! name the submission is written to, the command that compiles/runs it,
//! and the starter template the UI seeds the editor with.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    JavaScript,
    Python,
    Java,
    Cpp,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::JavaScript => "javascript",
            Language::Python => "python",
            Language::Java => "java",
            Language::Cpp => "cpp",
        }
    }

    /// Parse a language name as sent by the UI.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "javascript" | "js" | "node" => Some(Language::JavaScript),
            "python" | "py" => Some(Language::Python),
            "java" => Some(Language::Java),
            "cpp" | "c++" => Some(Language::Cpp),
            _ => None,
        }
    }

    /// Container image the submission runs in.
    pub fn image(&self) -> &'static str {
        match self {
            Language::JavaScript => "node:20-alpine",
            Language::Python => "python:3.12-alpine",
            Language::Java => "eclipse-temurin:21",
            Language::Cpp => "gcc:13",
        }
    }

    /// File name the submission is written to inside `/workspace`.
    pub fn source_file(&self) -> &'static str {
        match self {
            Language::JavaScript => "main.js",
            Language::Python => "main.py",
            Language::Java => "Solution.java",
            Language::Cpp => "main.cpp",
        }
    }

    /// Command run inside the container. Compiled languages copy the
    /// source out of the read-only mount before building.
    pub fn run_command(&self) -> Vec<String> {
        let parts: &[&str] = match self {
            Language::JavaScript => &["node", "/workspace/main.js"],
            Language::Python => &["python3", "/workspace/main.py"],
            Language::Java => &[
                "sh",
                "-c",
                "cp /workspace/Solution.java /tmp && cd /tmp && javac Solution.java && java Solution",
            ],
            Language::Cpp => &[
                "sh",
                "-c",
                "cp /workspace/main.cpp /tmp && cd /tmp && g++ -O2 -o main main.cpp && ./main",
            ],
        };
        parts.iter().map(|s| s.to_string()).collect()
    }

    /// Starter code the UI seeds the editor with.
    pub fn starter_template(&self) -> &'static str {
        match self {
            Language::JavaScript => {
                r#"function solve(nums, target) {
    // Your code here
}

// Test the function
const nums = [2, 7, 11, 15];
const target = 9;
const result = solve(nums, target);
console.log("Result:", result);"#
            }
            Language::Python => {
                r#"def solve(nums, target):
    # Your code here
    pass

# Test the function
nums = [2, 7, 11, 15]
target = 9
result = solve(nums, target)
print("Result:", result)"#
            }
            Language::Java => {
                r#"public class Solution {
    public int[] solve(int[] nums, int target) {
        // Your code here
        return new int[]{};
    }

    public static void main(String[] args) {
        Solution sol = new Solution();
        int[] nums = {2, 7, 11, 15};
        int target = 9;
        int[] result = sol.solve(nums, target);
        System.out.println("Result: " + java.util.Arrays.toString(result));
    }
}"#
            }
            Language::Cpp => {
                r#"#include <vector>
#include <iostream>
using namespace std;

class Solution {
public:
    vector<int> solve(vector<int>& nums, int target) {
        // Your code here
        return {};
    }
};

int main() {
    Solution sol;
    vector<int> nums = {2, 7, 11, 15};
    int target = 9;
    vector<int> result = sol.solve(nums, target);
    cout << "Result: ";
    for(int i : result) cout << i << " ";
    cout << endl;
    return 0;
}"#
            }
        }
    }

    pub fn all() -> &'static [Language] {
        &[
            Language::JavaScript,
            Language::Python,
            Language::Java,
            Language::Cpp,
        ]
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
