use std::fmt;

use serde::Serialize;

use super::ApplyResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub visited: usize,
    pub ignored: usize,
    pub to_check: usize,
    pub total: usize,
}

impl Summary {
    pub fn new(result: &ApplyResult, total: usize) -> Self {
        Self {
            visited: result.visited,
            ignored: result.ignored,
            to_check: result.to_check(total),
            total,
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} visited", self.visited)?;
        writeln!(f, "{} ignored", self.ignored)?;
        write!(f, "{} / {} to check", self.to_check, self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_three_lines() {
        let result = ApplyResult {
            ignored: 1,
            visited: 2,
            ..ApplyResult::default()
        };
        let summary = Summary::new(&result, 5);
        assert_eq!(summary.to_check, 2);
        assert_eq!(summary.to_string(), "2 visited\n1 ignored\n2 / 5 to check");
    }
}
