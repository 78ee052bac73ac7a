//! Interactive text menus.
//!
//! The portal reads one trimmed line per prompt from any [`BufRead`] and
//! writes to any [`Write`], so the same code drives stdin/stdout and
//! scripted tests. End of input ends the session like choosing Exit.

mod admin;
mod citizen;

use std::fmt::Display;
use std::io::{BufRead, Write};

use tracing::{debug, warn};

use crate::auth::verify_admin;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::{parse_whole, Citizen};
use crate::storage::Store;
use crate::table::Table;

const BANNER: &str = "=== Air Quality & Pollution Tracking Portal ===";

const MAIN_MENU: &str = "\
Main Menu:
1. Admin Login
2. Citizen Login
3. Register as New Citizen
4. Exit";

/// Line-oriented console over an input reader and an output writer.
#[derive(Debug)]
pub struct Console<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    /// Wrap an input and output pair.
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print `label` without a newline and read one trimmed line.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InputClosed`] at end of input.
    pub fn prompt(&mut self, label: &str) -> Result<String> {
        write!(self.output, "{label}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(Error::InputClosed);
        }
        Ok(line.trim().to_string())
    }

    /// Print a line.
    ///
    /// # Errors
    ///
    /// Returns an error if the output cannot be written.
    pub fn say(&mut self, text: impl Display) -> Result<()> {
        writeln!(self.output, "{text}")?;
        Ok(())
    }

    /// Print a table, or `empty` when it has no rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the output cannot be written.
    pub fn table(&mut self, table: &Table, empty: &str) -> Result<()> {
        if table.is_empty() {
            self.say(empty)
        } else {
            write!(self.output, "{table}")?;
            Ok(())
        }
    }

    /// Ask for a replacement value, keeping `current` on a blank answer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InputClosed`] at end of input.
    pub fn edit(&mut self, label: &str, current: &str) -> Result<String> {
        let answer = self.prompt(&format!("{label} [{current}]: "))?;
        Ok(if answer.is_empty() {
            current.to_string()
        } else {
            answer
        })
    }

    /// Give back the output writer.
    pub fn into_output(self) -> W {
        self.output
    }
}

/// Run the interactive portal until the user exits or input ends.
///
/// # Errors
///
/// Returns an error only if the console output fails.
pub fn run<R: BufRead, W: Write>(store: &Store, config: &Config, input: R, output: W) -> Result<()> {
    let mut portal = Portal {
        store,
        config,
        console: Console::new(input, output),
    };
    match portal.main_menu() {
        Err(err) if err.is_input_closed() => {
            debug!("Input closed, leaving portal");
            Ok(())
        }
        other => other,
    }
}

/// A menu session bound to a store and configuration.
struct Portal<'a, R, W> {
    store: &'a Store,
    config: &'a Config,
    console: Console<R, W>,
}

impl<R: BufRead, W: Write> Portal<'_, R, W> {
    /// Print an error from a menu action and carry on.
    ///
    /// Closed input and console failures still end the session.
    fn recover(&mut self, result: Result<()>) -> Result<()> {
        match result {
            Err(err @ (Error::InputClosed | Error::Io(_))) => Err(err),
            Err(err) => {
                warn!("Menu action failed: {}", err);
                self.console.say(format!("Error: {err}"))
            }
            Ok(()) => Ok(()),
        }
    }

    fn choose(&mut self, menu: &str) -> Result<String> {
        self.console.say(menu)?;
        self.console.prompt("Choice: ")
    }

    fn main_menu(&mut self) -> Result<()> {
        self.console.say(BANNER)?;
        loop {
            let result = match self.choose(MAIN_MENU)?.as_str() {
                "1" => self.admin_login(),
                "2" => self.citizen_login(),
                "3" => self.register_citizen(),
                "4" => {
                    self.console.say("Goodbye.")?;
                    return Ok(());
                }
                _ => self.console.say("Invalid choice."),
            };
            self.recover(result)?;
        }
    }

    fn admin_login(&mut self) -> Result<()> {
        self.console.say("Admin login")?;
        let username = self.console.prompt("Username: ")?;
        let password = self.console.prompt("Password: ")?;

        if verify_admin(&self.config.admin, &username, &password) {
            self.console.say("Logged in as admin.")?;
            self.admin_menu()
        } else {
            warn!("Rejected admin login for '{}'", username);
            self.console.say("Invalid credentials.")
        }
    }

    fn citizen_login(&mut self) -> Result<()> {
        let id = self.console.prompt("Enter Citizen ID: ")?;
        match self.store.find::<Citizen>(&id) {
            Some(citizen) => self.citizen_menu(citizen),
            None => self.console.say("Citizen not found. Please register."),
        }
    }

    fn register_citizen(&mut self) -> Result<()> {
        self.console.say("Register new citizen")?;
        let name = self.console.prompt("Name: ")?;
        let age = parse_whole(&self.console.prompt("Age: ")?);
        let location = self.console.prompt("Location / Region: ")?;
        let contact = self.console.prompt("Contact (email/phone): ")?;

        let citizen = Citizen::new(name, age, location, contact);
        let id = citizen.citizen_id.clone();
        self.store.insert(citizen)?;
        self.console.say(format!("Registered. Your Citizen ID: {id}"))
    }
}
