use crate::objects::participant::Participant;

/// Class selection used to pick which part of the roster a screen shows.
#[derive(Debug, Clone, Default)]
pub struct ClassFilter {
    all: Vec<String>,
    selected: Vec<String>,
}

impl ClassFilter {
    pub fn new(participants: &[Participant]) -> ClassFilter {
        let mut all: Vec<String> = Vec::new();
        for p in participants {
            if !all.iter().any(|c| c == p.class()) {
                all.push(String::from(p.class()));
            }
        }
        ClassFilter { all, selected: Vec::new() }
    }

    pub fn classes(&self) -> &[String] {
        &self.all
    }

    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    pub fn is_selected(&self, class: &str) -> bool {
        self.selected.iter().any(|c| c == class)
    }

    /// Returns false for a class the roster doesn't have.
    pub fn toggle(&mut self, class: &str) -> bool {
        if !self.all.iter().any(|c| c == class) {
            return false
        }
        match self.selected.iter().position(|c| c == class) {
            Some(ix) => {
                self.selected.remove(ix);
            },
            None => self.selected.push(String::from(class)),
        }
        true
    }

    /// Clears the selection if everything is selected, otherwise selects all.
    pub fn toggle_all(&mut self) {
        if self.selected.len() == self.all.len() {
            self.selected.clear();
        } else {
            self.selected = self.all.clone();
        }
    }

    pub fn apply(&self, participants: &[Participant]) -> Vec<Participant> {
        participants.iter()
            .filter(|p| self.is_selected(p.class()))
            .cloned()
            .collect()
    }
}
