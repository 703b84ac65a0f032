//! Construction report types: entries, severity levels, and report aggregation.

use ldc_model::Term;

/// Severity level of a report entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Normal progress (a rule ran, a guard stopped a recursion).
    Info,
    /// Something in the ontology was skipped; the instance is still valid.
    Warning,
}

/// What a report entry records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    /// A rule of the given owning class was executed.
    RuleExecuted {
        /// The class the rule is attached to (the class itself or an ancestor).
        rule_class: Term,
    },
    /// A restriction whose value class is the class under construction.
    SelfReference,
    /// A restriction whose value class was already reached in this construction.
    CycleGuardTrip,
    /// A restriction that could not be resolved in the working model.
    RestrictionSkipped,
}

/// A single report entry.
#[derive(Debug, Clone)]
pub struct ReportEntry {
    /// What happened.
    pub kind: EntryKind,
    /// The class being constructed when it happened.
    pub class: Term,
    /// The instance being constructed when it happened.
    pub instance: Term,
    /// Human-readable message describing the outcome.
    pub message: String,
}

impl ReportEntry {
    /// Severity of this entry.
    #[must_use]
    pub fn severity(&self) -> Severity {
        match self.kind {
            EntryKind::RestrictionSkipped => Severity::Warning,
            _ => Severity::Info,
        }
    }

    /// Returns true if this entry is a warning.
    #[must_use]
    pub fn is_warning(&self) -> bool {
        self.severity() == Severity::Warning
    }
}

/// Everything notable that happened during one construction pass.
#[derive(Debug, Default)]
pub struct ConstructionReport {
    /// All entries, in the order they occurred.
    pub entries: Vec<ReportEntry>,
    /// Blank nodes minted during the pass (sub-instances and rule output).
    pub new_resources: Vec<Term>,
}

impl ConstructionReport {
    /// Creates a new empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry to this report.
    pub fn push(&mut self, entry: ReportEntry) {
        self.entries.push(entry);
    }

    /// Extends this report with the entries and resources of another report.
    pub fn extend(&mut self, other: ConstructionReport) {
        self.entries.extend(other.entries);
        self.new_resources.extend(other.new_resources);
    }

    /// Iterates over warning entries.
    pub fn warnings(&self) -> impl Iterator<Item = &ReportEntry> {
        self.entries.iter().filter(|e| e.is_warning())
    }

    /// Returns the count of warnings.
    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    /// Returns the number of entries of the given kind.
    #[must_use]
    pub fn count(&self, kind: &EntryKind) -> usize {
        self.entries.iter().filter(|e| &e.kind == kind).count()
    }

    /// Returns the number of rules executed.
    #[must_use]
    pub fn rules_executed(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.kind, EntryKind::RuleExecuted { .. }))
            .count()
    }

    /// Returns true if no restriction had to be skipped.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.warning_count() == 0
    }
}
