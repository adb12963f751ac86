use crate::core::category::SmellCategory;
use crate::detector::prompts;

/// One category's detection task: the category and its fixed instruction
/// block. Tasks carry no state; the orchestrator owns scheduling.
#[derive(Debug, Clone)]
pub struct DetectorTask {
    pub category: SmellCategory,
    pub instructions: String,
}

/// The configured set of detector tasks, in the fixed category order the
/// report is merged in. Requesting a category twice, or in another order,
/// changes nothing.
#[derive(Debug, Clone)]
pub struct CategoryRegistry {
    tasks: Vec<DetectorTask>,
}

impl CategoryRegistry {
    pub fn for_categories(enabled: &[SmellCategory]) -> Self {
        let tasks = SmellCategory::all()
            .iter()
            .filter(|c| enabled.contains(c))
            .map(|&category| DetectorTask {
                category,
                instructions: prompts::instructions_for(category),
            })
            .collect();
        Self { tasks }
    }

    pub fn all() -> Self {
        Self::for_categories(SmellCategory::all())
    }

    pub fn tasks(&self) -> &[DetectorTask] {
        &self.tasks
    }

    pub fn categories(&self) -> Vec<SmellCategory> {
        self.tasks.iter().map(|t| t.category).collect()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Position of a category in merge order.
    pub fn position(&self, category: SmellCategory) -> usize {
        self.tasks
            .iter()
            .position(|t| t.category == category)
            .unwrap_or(usize::MAX)
    }
}
