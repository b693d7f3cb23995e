use crate::command::Command;

/// LIFO of the current turn's applied moves. Cleared when a turn is
/// confirmed; drained piece by piece to rewind.
#[derive(Default)]
pub struct History {
    stack: Vec<Box<dyn Command>>,
}

impl History {
    pub fn new() -> History {
        History { stack: Vec::new() }
    }

    pub fn push(&mut self, command: Box<dyn Command>) {
        self.stack.push(command);
    }

    pub fn pop(&mut self) -> Option<Box<dyn Command>> {
        self.stack.pop()
    }

    pub fn clear(&mut self) {
        self.stack.clear();
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::parse_move;

    #[test]
    fn pops_in_reverse_order() {
        let mut history = History::new();
        history.push(parse_move(0, "split", "s0 1").unwrap());
        history.push(parse_move(0, "remove", "s0 0").unwrap());
        assert_eq!(history.len(), 2);
        assert!(history.pop().is_some());
        assert!(history.pop().is_some());
        assert!(history.pop().is_none());
    }

    #[test]
    fn clear_empties_the_stack() {
        let mut history = History::new();
        history.push(parse_move(0, "split", "s0 1").unwrap());
        history.clear();
        assert!(history.is_empty());
    }
}
