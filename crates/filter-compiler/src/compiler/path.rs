use crate::error::CompileError;
use model::schema::{Column, TableId};

/// The relational and derived columns currently being resolved, outermost
/// first.
#[derive(Debug)]
pub(crate) struct ResolutionPath {
    steps: Vec<(TableId, String)>,
    max_depth: usize,
}

impl ResolutionPath {
    pub fn new(max_depth: usize) -> Self {
        Self {
            steps: Vec::new(),
            max_depth,
        }
    }

    pub fn enter(&mut self, table: &TableId, column: &Column) -> Result<(), CompileError> {
        let step = (table.clone(), column.key().to_string());

        if self.steps.contains(&step) {
            let mut trail: Vec<String> = self
                .steps
                .iter()
                .map(|(t, c)| format!("{t}.{c}"))
                .collect();
            trail.push(format!("{}.{}", step.0, step.1));
            return Err(CompileError::CycleDetected(trail.join(" -> ")));
        }
        if self.steps.len() >= self.max_depth {
            return Err(CompileError::DepthExceeded(self.max_depth));
        }

        self.steps.push(step);
        Ok(())
    }

    pub fn leave(&mut self) {
        self.steps.pop();
    }

    #[cfg(test)]
    pub fn depth(&self) -> usize {
        self.steps.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revisit_reports_trail() {
        let mut path = ResolutionPath::new(8);
        let a = Column::lookup("A", "Rel", "B");
        let b = Column::lookup("B", "Rel", "A");

        path.enter(&"t1".into(), &a).unwrap();
        path.enter(&"t2".into(), &b).unwrap();
        let err = path.enter(&"t1".into(), &a).unwrap_err();
        assert_eq!(err, CompileError::CycleDetected("t1.A -> t2.B -> t1.A".into()));
    }

    #[test]
    fn test_same_column_on_other_table_is_fine() {
        let mut path = ResolutionPath::new(8);
        let a = Column::lookup("A", "Rel", "A");
        path.enter(&"t1".into(), &a).unwrap();
        path.enter(&"t2".into(), &a).unwrap();
        path.leave();
        path.enter(&"t3".into(), &a).unwrap();
        assert_eq!(path.depth(), 2);
    }

    #[test]
    fn test_depth_bound() {
        let mut path = ResolutionPath::new(2);
        let a = Column::lookup("A", "Rel", "A");
        path.enter(&"t1".into(), &a).unwrap();
        path.enter(&"t2".into(), &a).unwrap();
        assert_eq!(
            path.enter(&"t3".into(), &a),
            Err(CompileError::DepthExceeded(2))
        );
    }
}
