use anyhow::Result;

use crate::App;
use crate::elements::FORM_ELEMENTS;

impl<R, H> App<R, H> {
    /// Print the form fields this plugin needs, as JSON.
    pub fn cmd_elements(&self, stdout: &mut impl std::io::Write) -> Result<()> {
        let json = serde_json::to_string_pretty(&FORM_ELEMENTS)?;
        writeln!(stdout, "{json}")?;
        Ok(())
    }
}
