//! Redefinition policy
//!
//! Adjudicates a second declaration of a name that already has a declarator at
//! the same scope level. Constants make the collision fatal; anything else is
//! advisory. In both cases the caller merges the new occurrence into the
//! existing declaration and carries on.

use crate::diagnostic::{error_codes, Diagnostic, RelatedLocation};
use crate::registry::Declarator;

/// How serious a redefinition is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Fatal,
    Advisory,
}

/// A same-level collision between two declarators of one name
#[derive(Debug, Clone, Copy)]
pub struct Redefinition<'a> {
    /// The declarator already in scope
    pub first: &'a Declarator,
    /// The incoming declarator
    pub second: &'a Declarator,
    /// The collision was found in the function scope while inside a nested block
    pub subblock: bool,
}

impl<'a> Redefinition<'a> {
    pub fn new(first: &'a Declarator, second: &'a Declarator, subblock: bool) -> Self {
        Self {
            first,
            second,
            subblock,
        }
    }

    pub fn severity(&self) -> Severity {
        if self.first.kind.is_const() || self.second.kind.is_const() {
            Severity::Fatal
        } else {
            Severity::Advisory
        }
    }

    /// Build the report for this collision, located at the second definition
    pub fn to_diagnostic(&self, file: &str) -> Diagnostic {
        let name = &self.second.name;
        let (message, mut diag) = match self.severity() {
            Severity::Fatal => {
                let message = format!("Constant '{}' was defined twice in the same scope", name);
                let diag = Diagnostic::error_with_code(
                    error_codes::CONSTANT_REDEFINITION,
                    message.clone(),
                    self.second.span,
                )
                .with_help(format!(
                    "constants cannot be redeclared; rename one of the '{}' declarations",
                    name
                ));
                (message, diag)
            }
            Severity::Advisory => {
                let message = format!("Variable '{}' was defined twice in the same scope", name);
                let diag = Diagnostic::warning_with_code(
                    error_codes::VARIABLE_REDEFINITION,
                    message.clone(),
                    self.second.span,
                )
                .with_help(format!(
                    "both declarations of '{}' refer to the same binding",
                    name
                ));
                (message, diag)
            }
        };
        tracing::debug!(%message, subblock = self.subblock, "redefinition");

        let first_file = if self.first.span.is_dummy() {
            "<intrinsic>".to_string()
        } else {
            file.to_string()
        };

        diag = diag
            .with_file(file)
            .with_label(self.second_label())
            .with_note(format!(
                "first definition is {}-style, second definition is {}-style",
                self.first.kind, self.second.kind
            ))
            .with_related_location(RelatedLocation {
                file: first_file,
                span: self.first.span,
                message: format!("first definition, {}-style", self.first.kind),
            });
        diag
    }

    fn second_label(&self) -> String {
        if self.subblock {
            format!("second definition, in a subblock, {}-style", self.second.kind)
        } else {
            format!("second definition, {}-style", self.second.kind)
        }
    }
}
