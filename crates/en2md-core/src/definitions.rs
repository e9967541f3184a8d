//! Definition lists

use crate::diagnostics::DiagnosticKind;
use crate::options::DefinitionStyle;
use crate::walker::{Scope, Walker};

impl Walker<'_> {
    pub(crate) fn definitions(&mut self, scope: &Scope<'_>) -> String {
        match self.options.definitions {
            DefinitionStyle::Markdown => self.markdown_definitions(scope),
            DefinitionStyle::Html => self.html_definitions(scope),
        }
    }

    fn markdown_definitions(&mut self, scope: &Scope<'_>) -> String {
        let element = scope.element;
        if element.child_elements().next().is_some_and(|e| e.name != "dt") {
            self.diagnostics.push(
                DiagnosticKind::InvalidDefinitionList,
                "Definition list does not start with a term, keeping it as HTML",
            );
            return self.html_definitions(scope);
        }

        let mut out = String::from("\n");
        for child in element.child_elements() {
            let text = self.merge(&child.children, &scope.child(child));
            match child.name.as_str() {
                "dt" => out.push_str(&format!("\n{text}\n")),
                _ => out.push_str(&format!(": {text}\n")),
            }
        }
        out
    }

    fn html_definitions(&mut self, scope: &Scope<'_>) -> String {
        let element = scope.element;
        let mut out = format!("<{}>", element.name);
        for child in element.child_elements() {
            let text = self.merge(&child.children, &scope.child(child));
            out.push_str(&format!("<{0}>{text}</{0}>", child.name));
        }
        out.push_str(&format!("</{}>\n\n", element.name));
        out
    }
}
