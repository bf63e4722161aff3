//! Purpose: Drive a `RecordStore` from a line-oriented menu session.
//! Exports: `Session`, `SessionConfig`.
//! Role: Thin collaborator; prompts, parses fields, and maps store outcomes to messages.
//! Invariants: The store is owned by the session; no process-wide mutable state.
//! Invariants: Store failures are reported and the loop continues; nothing is retried.
//! Invariants: End of input behaves like choosing Exit.
use std::fmt;
use std::io::{BufRead, Write};
use std::str::FromStr;

use partstore::api::{
    BoundedText, Error, ErrorKind, PART_NAME_MAX, PartRecord, Reallocate, RecordStore, Removal,
    SIZE_METRIC_MAX,
};
use tracing::{debug, info};

use crate::render::{RecordFormat, write_records};

const MENU: &str = "\n===== MENU =====
1) Print all records
2) Print number of records
3) Print database size (in bytes)
4) Add a record
5) Delete the last record
6) Exit";

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum MenuChoice {
    PrintAll,
    PrintCount,
    PrintSize,
    Add,
    DeleteLast,
    Exit,
}

impl MenuChoice {
    fn from_number(number: i64) -> Option<Self> {
        match number {
            1 => Some(MenuChoice::PrintAll),
            2 => Some(MenuChoice::PrintCount),
            3 => Some(MenuChoice::PrintSize),
            4 => Some(MenuChoice::Add),
            5 => Some(MenuChoice::DeleteLast),
            6 => Some(MenuChoice::Exit),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, Default)]
pub(crate) struct SessionConfig {
    pub format: RecordFormat,
    pub quiet: bool,
}

/// How a field prompt ended.
enum Field<T> {
    Value(T),
    EndOfInput,
}

pub(crate) struct Session<I, O, R> {
    input: I,
    output: O,
    store: RecordStore<R>,
    config: SessionConfig,
}

impl<I, O, R> Session<I, O, R>
where
    I: BufRead,
    O: Write,
    R: Reallocate,
{
    pub(crate) fn new(input: I, output: O, store: RecordStore<R>, config: SessionConfig) -> Self {
        Self {
            input,
            output,
            store,
            config,
        }
    }

    #[cfg(test)]
    pub(crate) fn store(&self) -> &RecordStore<R> {
        &self.store
    }

    #[cfg(test)]
    pub(crate) fn into_output(self) -> O {
        self.output
    }

    /// Run the menu loop until Exit or end of input.
    pub(crate) fn run(&mut self) -> Result<(), Error> {
        info!(format = ?self.config.format, "session started");
        loop {
            if !self.config.quiet {
                self.say(format_args!("{MENU}"))?;
            }
            self.prompt("Select an option: ")?;
            let Some(line) = self.read_line()? else {
                self.say(format_args!(""))?;
                break;
            };

            let choice = match line.trim().parse::<i64>() {
                Ok(number) => MenuChoice::from_number(number),
                Err(_) => {
                    self.say(format_args!("Invalid input! Please enter a number."))?;
                    continue;
                }
            };
            let Some(choice) = choice else {
                self.say(format_args!("Invalid option, please try again."))?;
                continue;
            };
            debug!(?choice, "menu choice");

            match choice {
                MenuChoice::PrintAll => {
                    write_records(&mut self.output, &self.store, self.config.format)
                        .map_err(io_error)?;
                }
                MenuChoice::PrintCount => {
                    let count = self.store.count();
                    self.say(format_args!("\nNumber of records: {count}"))?;
                }
                MenuChoice::PrintSize => {
                    let bytes = self.store.byte_size();
                    self.say(format_args!("\nDatabase size: {bytes} bytes"))?;
                }
                MenuChoice::Add => {
                    if !self.add_record()? {
                        break;
                    }
                }
                MenuChoice::DeleteLast => self.delete_last()?,
                MenuChoice::Exit => break,
            }
        }

        self.say(format_args!("Exiting program..."))?;
        let count = self.store.count();
        self.store.release();
        info!(count, "session ended");
        Ok(())
    }

    /// Returns `false` when input ended before the record was complete.
    fn add_record(&mut self) -> Result<bool, Error> {
        self.say(format_args!("\n--- Add a New Record ---"))?;
        let Field::Value(part_number) = self.read_number::<i32>("Enter part number (integer): ")?
        else {
            return self.abandon_record();
        };
        let Field::Value(part_name) =
            self.read_text::<PART_NAME_MAX>("Enter part name (up to 49 chars): ")?
        else {
            return self.abandon_record();
        };
        let Field::Value(part_size) = self.read_number::<f32>("Enter part size (float): ")? else {
            return self.abandon_record();
        };
        let Field::Value(size_metric) =
            self.read_text::<SIZE_METRIC_MAX>("Enter size metric (up to 9 chars): ")?
        else {
            return self.abandon_record();
        };
        let Field::Value(part_cost) = self.read_number::<f32>("Enter part cost (float): ")? else {
            return self.abandon_record();
        };

        let record = PartRecord {
            part_number,
            part_name,
            part_size,
            size_metric,
            part_cost,
        };
        match self.store.append(record) {
            Ok(_) => self.say(format_args!("\nA new record was successfully added."))?,
            Err(err) if err.kind() == ErrorKind::Alloc => {
                self.say(format_args!(
                    "\nMemory reallocation failed. Cannot add a new record."
                ))?;
                self.say_hint(&err)?;
            }
            Err(err) => return Err(err),
        }
        Ok(true)
    }

    fn abandon_record(&mut self) -> Result<bool, Error> {
        self.say(format_args!("\nInput ended; the partial record was discarded."))?;
        Ok(false)
    }

    fn delete_last(&mut self) -> Result<(), Error> {
        match self.store.remove_last() {
            Ok(Removal::AlreadyEmpty) => {
                self.say(format_args!("\nThere are no records to delete."))
            }
            Ok(Removal::Removed(_)) if self.store.is_empty() => self.say(format_args!(
                "\nDeleted the last record. The database is now empty."
            )),
            Ok(Removal::Removed(_)) => {
                let count = self.store.count();
                self.say(format_args!(
                    "\nDeleted the last record. New record count: {count}"
                ))
            }
            Err(err) if err.kind() == ErrorKind::Alloc => {
                self.say(format_args!("\nError: reallocation failed while deleting."))?;
                self.say_hint(&err)
            }
            Err(err) => Err(err),
        }
    }

    fn read_number<T: FromStr + Finite>(&mut self, prompt: &str) -> Result<Field<T>, Error> {
        loop {
            self.prompt(prompt)?;
            let Some(line) = self.read_line()? else {
                return Ok(Field::EndOfInput);
            };
            match line.trim().parse::<T>() {
                Ok(value) if value.is_finite_value() => return Ok(Field::Value(value)),
                _ => self.say(format_args!("Invalid number, please try again."))?,
            }
        }
    }

    fn read_text<const N: usize>(&mut self, prompt: &str) -> Result<Field<BoundedText<N>>, Error> {
        self.prompt(prompt)?;
        let Some(line) = self.read_line()? else {
            return Ok(Field::EndOfInput);
        };
        if BoundedText::<N>::would_truncate(&line) {
            debug!(capacity = N, len = line.len(), "text field truncated");
        }
        Ok(Field::Value(BoundedText::new(&line)))
    }

    /// Read one line without its terminator; `None` at end of input.
    fn read_line(&mut self) -> Result<Option<String>, Error> {
        let mut line = String::new();
        let read = self.input.read_line(&mut line).map_err(io_error)?;
        if read == 0 {
            return Ok(None);
        }
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(Some(line))
    }

    fn prompt(&mut self, prompt: &str) -> Result<(), Error> {
        write!(self.output, "{prompt}").map_err(io_error)?;
        self.output.flush().map_err(io_error)
    }

    fn say(&mut self, args: fmt::Arguments<'_>) -> Result<(), Error> {
        writeln!(self.output, "{args}").map_err(io_error)
    }

    fn say_hint(&mut self, err: &Error) -> Result<(), Error> {
        match err.hint() {
            Some(hint) => self.say(format_args!("hint: {hint}")),
            None => Ok(()),
        }
    }
}

/// Numeric field types the console accepts.
trait Finite {
    fn is_finite_value(&self) -> bool;
}

impl Finite for i32 {
    fn is_finite_value(&self) -> bool {
        true
    }
}

impl Finite for f32 {
    fn is_finite_value(&self) -> bool {
        self.is_finite()
    }
}

fn io_error(err: std::io::Error) -> Error {
    Error::new(ErrorKind::Io)
        .with_message("console i/o failed")
        .with_source(err)
}

#[cfg(test)]
mod tests {
    use super::{Session, SessionConfig};
    use crate::render::RecordFormat;
    use partstore::api::{RECORD_SIZE, RecordStore, StoreOptions};
    use std::io::Cursor;

    fn run_script(script: &str, store: RecordStore) -> String {
        let config = SessionConfig {
            format: RecordFormat::Human,
            quiet: true,
        };
        let mut session = Session::new(Cursor::new(script.to_string()), Vec::new(), store, config);
        session.run().expect("session");
        assert!(!session.store().has_backing_storage(), "store released on exit");
        String::from_utf8(session.into_output()).expect("utf8")
    }

    fn run(script: &str) -> String {
        run_script(script, RecordStore::new())
    }

    #[test]
    fn scenario_add_two_remove_one() {
        let out = run("4\n111\nBolt\n5.0\nmm\n0.25\n2\n3\n4\n222\nNut\n3.0\nmm\n0.10\n5\n1\n6\n");
        assert!(out.contains("A new record was successfully added."));
        assert!(out.contains("Number of records: 1"));
        assert!(out.contains(&format!("Database size: {RECORD_SIZE} bytes")));
        assert!(out.contains("Deleted the last record. New record count: 1"));
        assert!(out.contains(" Part name:       Bolt"));
        assert!(!out.contains(" Part name:       Nut"));
        assert!(out.trim_end().ends_with("Exiting program..."));
    }

    #[test]
    fn deleting_only_record_reports_empty_database() {
        let out = run("4\n1\nPipe\n23.75\nmm\n8.83\n5\n5\n3\n6\n");
        assert!(out.contains("Deleted the last record. The database is now empty."));
        assert!(out.contains("There are no records to delete."));
        assert!(out.contains("Database size: 0 bytes"));
    }

    #[test]
    fn invalid_menu_input_is_reported() {
        let out = run("abc\n9\n6\n");
        assert!(out.contains("Invalid input! Please enter a number."));
        assert!(out.contains("Invalid option, please try again."));
    }

    #[test]
    fn malformed_numeric_fields_are_reprompted() {
        let out = run("4\nten\n10\nWasher\nbig\nNaN\n1.5\nin\n0.05\n1\n6\n");
        assert_eq!(out.matches("Invalid number, please try again.").count(), 3);
        assert!(out.contains(" Part number:     10"));
        assert!(out.contains(" Part size:       1.50"));
    }

    #[test]
    fn long_text_is_truncated_silently() {
        let out = run("4\n5\nBolt\n1\nmillimetres\n1\n1\n6\n");
        assert!(out.contains(" Size metric:     millimetr\n"));
    }

    #[test]
    fn long_part_name_keeps_first_49_bytes() {
        let name = "x".repeat(60);
        let out = run(&format!("4\n5\n{name}\n1\nmm\n1\n1\n6\n"));
        assert!(out.contains(&format!(" Part name:       {}\n", "x".repeat(49))));
        assert!(!out.contains(&"x".repeat(50)));
    }

    #[test]
    fn end_of_input_exits_cleanly() {
        let out = run("2\n");
        assert!(out.contains("Number of records: 0"));
        assert!(out.trim_end().ends_with("Exiting program..."));
    }

    #[test]
    fn end_of_input_mid_record_discards_it() {
        let out = run("4\n7\nGear\n");
        assert!(out.contains("the partial record was discarded"));
        assert!(!out.contains("successfully added"));
    }

    #[test]
    fn exhausted_budget_reports_failure_and_keeps_going() {
        let store = RecordStore::with_options(StoreOptions::new().with_max_bytes(RECORD_SIZE));
        let out = run_script(
            "4\n1\nBolt\n5\nmm\n0.25\n4\n2\nNut\n3\nmm\n0.1\n2\n6\n",
            store,
        );
        assert!(out.contains("A new record was successfully added."));
        assert!(out.contains("Memory reallocation failed. Cannot add a new record."));
        assert!(out.contains("hint: Raise --max-bytes"));
        assert!(out.contains("Number of records: 1"));
    }

    #[test]
    fn banner_is_printed_unless_quiet() {
        let config = SessionConfig::default();
        let mut session = Session::new(
            Cursor::new("6\n".to_string()),
            Vec::new(),
            RecordStore::new(),
            config,
        );
        session.run().expect("session");
        let out = String::from_utf8(session.into_output()).expect("utf8");
        assert!(out.contains("===== MENU ====="));
        assert!(out.contains("6) Exit"));
    }
}
