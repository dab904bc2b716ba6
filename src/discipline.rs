use serde::{Deserialize, Serialize};
use std::fmt;

// Title markers are wire-level contracts with the upstream board and must
// not change without a data migration on the board side.
const QA_TAG: &str = "[qa]";
const BACKEND_TAG: &str = "[be]";
const FRONTEND_TAG: &str = "[fe]";
const DEVOPS_TAG: &str = "devops";
const TEST_PLAN_PHRASE: &str = "plano de testes";

/// Work stream a task belongs to, derived from its title tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Discipline {
    Backend,
    Frontend,
    Qa,
    DevOps,
    Unknown,
}

impl Discipline {
    pub fn as_str(&self) -> &'static str {
        match self {
            Discipline::Backend => "backend",
            Discipline::Frontend => "frontend",
            Discipline::Qa => "qa",
            Discipline::DevOps => "devops",
            Discipline::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Discipline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of a task title: the discipline pool it routes to plus
/// whether it is a test-plan task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TitleTag {
    pub discipline: Discipline,
    pub is_test_plan: bool,
}

/// Maps a task title to its discipline by case-insensitive substring match.
///
/// Tag priority when several match: `[QA]`, `[BE]`, `[FE]`, `DevOps`.
/// The phrase `Plano de Testes` marks a qa task as a test plan.
pub fn classify_title(title: &str) -> TitleTag {
    let lower = title.to_lowercase();
    let discipline = if lower.contains(QA_TAG) {
        Discipline::Qa
    } else if lower.contains(BACKEND_TAG) {
        Discipline::Backend
    } else if lower.contains(FRONTEND_TAG) {
        Discipline::Frontend
    } else if lower.contains(DEVOPS_TAG) {
        Discipline::DevOps
    } else {
        Discipline::Unknown
    };

    TitleTag {
        discipline,
        is_test_plan: discipline == Discipline::Qa && lower.contains(TEST_PLAN_PHRASE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_route_to_their_pools() {
        assert_eq!(classify_title("[BE] build api").discipline, Discipline::Backend);
        assert_eq!(classify_title("[fe] polish form").discipline, Discipline::Frontend);
        assert_eq!(classify_title("[QA] regression").discipline, Discipline::Qa);
        assert_eq!(classify_title("DevOps pipeline").discipline, Discipline::DevOps);
        assert_eq!(classify_title("write docs").discipline, Discipline::Unknown);
    }

    #[test]
    fn qa_tag_wins_over_later_markers() {
        let tag = classify_title("[QA] verify devops rollout");
        assert_eq!(tag.discipline, Discipline::Qa);
    }

    #[test]
    fn test_plan_requires_qa_discipline() {
        let tag = classify_title("[QA] Elaboração de Plano de Testes");
        assert!(tag.is_test_plan);
        let not_qa = classify_title("[BE] plano de testes de carga");
        assert!(!not_qa.is_test_plan);
    }
}
