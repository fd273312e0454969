use std::io::{self, Read};
use std::path::Path;

use codecept_export_core::assembler::{Assembler, ExportedFile, RenderOptions};
use codecept_export_core::command::Project;
use codecept_export_core::ExportError;

/// What to export from a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Test(String),
    Suite(String),
    /// Every test, one file each.
    AllTests,
}

/// Converts recorded `.side` projects into Codeception class files.
#[derive(Default)]
pub struct SideConverter {
    assembler: Assembler,
}

impl SideConverter {
    pub fn load_file(path: &Path) -> Result<Project, ExportError> {
        let content = std::fs::read_to_string(path)?;
        Self::load_str(&content)
    }

    pub fn load_stdin() -> Result<Project, ExportError> {
        let mut content = String::new();
        io::stdin().read_to_string(&mut content)?;
        Self::load_str(&content)
    }

    fn load_str(content: &str) -> Result<Project, ExportError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Generates the selected classes, ready to be written as `.php` files.
    pub async fn convert(
        &self,
        project: &Project,
        selection: &Selection,
        options: &RenderOptions,
    ) -> Result<Vec<ExportedFile>, ExportError> {
        match selection {
            Selection::Test(name) => {
                let test = project
                    .find_test(name)
                    .ok_or_else(|| ExportError::MissingTest(name.clone()))?;
                let file = self.assembler.emit_test(test, &project.tests, options).await?;
                Ok(vec![file.without_marker()])
            }
            Selection::Suite(name) => {
                let suite = project
                    .find_suite(name)
                    .ok_or_else(|| ExportError::MissingSuite(name.clone()))?;
                let file = self.assembler.emit_suite(suite, &project.tests, options).await?;
                Ok(vec![file.without_marker()])
            }
            Selection::AllTests => {
                let mut files = Vec::with_capacity(project.tests.len());
                for test in &project.tests {
                    let file = self.assembler.emit_test(test, &project.tests, options).await?;
                    files.push(file.without_marker());
                }
                Ok(files)
            }
        }
    }
}
