use crate::objects::participant::Participant;

#[derive(Debug, Clone, PartialEq)]
pub struct ClassGroup {
    pub class: String,
    pub members: Vec<Participant>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Column {
    pub groups: Vec<ClassGroup>,
    pub total: usize,
}

/// Groups participants by class and spreads the groups over `columns`
/// columns, largest group first, each into the column with the fewest
/// members so far (lowest index on ties). A class never spans two columns.
/// Participants without a class are left out.
pub fn balance(participants: &[Participant], columns: usize) -> Vec<Column> {
    if columns == 0 {
        return Vec::new()
    }
    let mut groups: Vec<ClassGroup> = Vec::new();
    for p in participants.iter().filter(|p| !p.class().is_empty()) {
        match groups.iter_mut().find(|g| g.class == p.class()) {
            Some(group) => group.members.push(p.clone()),
            None => groups.push(ClassGroup {
                class: String::from(p.class()),
                members: vec![p.clone()],
            }),
        }
    }
    // stable, equal sized classes keep first-seen order
    groups.sort_by(|a, b| b.members.len().cmp(&a.members.len()));
    let mut output: Vec<Column> = vec![Column::default(); columns];
    for group in groups {
        let mut target: usize = 0;
        for (ix, col) in output.iter().enumerate() {
            if col.total < output[target].total {
                target = ix;
            }
        }
        output[target].total += group.members.len();
        output[target].groups.push(group);
    }
    output
}

/// Tracks which class header is topmost in each column's scrolled view.
#[derive(Debug, Clone, Default)]
pub struct StickyLabels {
    tops: Vec<Vec<(String, f64)>>,
    labels: Vec<String>,
}

impl StickyLabels {
    pub fn new(columns: usize) -> StickyLabels {
        StickyLabels {
            tops: vec![Vec::new(); columns],
            labels: vec![String::new(); columns],
        }
    }

    /// Records where a class group starts within a column's content.
    pub fn set_group_top(&mut self, column: usize, class: &str, top: f64) {
        let Some(tops) = self.tops.get_mut(column) else {
            return
        };
        match tops.iter_mut().find(|(c, _)| c == class) {
            Some(entry) => entry.1 = top,
            None => tops.push((String::from(class), top)),
        }
    }

    /// Updates the label for a column scrolled to `y` and returns it. Empty
    /// when no group starts at or above `y`.
    pub fn on_scroll(&mut self, column: usize, y: f64) -> &str {
        let Some(tops) = self.tops.get(column) else {
            return ""
        };
        let mut closest: Option<(&str, f64)> = None;
        for (class, top) in tops {
            if *top <= y && closest.map_or(true, |(_, distance)| y - top < distance) {
                closest = Some((class.as_str(), y - top));
            }
        }
        let label = closest.map(|(c, _)| String::from(c)).unwrap_or_default();
        self.labels[column] = label;
        &self.labels[column]
    }
}
