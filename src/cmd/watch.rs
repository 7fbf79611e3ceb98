//! Watch command - live estimate preview driven by `field=value` lines on stdin
//!
//! Each line edits one form field. The estimate is recomputed once input has
//! been idle for the debounce delay.

use crate::cmd::RateArgs;
use crate::core::FieldCheck;
use crate::display::{eur, percent};
use crate::fx::ExchangeRate;
use crate::session::{EstimatorForm, FormField, DEBOUNCE_DELAY};
use clap::Args;
use std::io::{self, BufRead};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

#[derive(Args, Debug)]
pub struct WatchCommand {
    #[command(flatten)]
    rate: RateArgs,

    /// Idle time in milliseconds before the estimate is recomputed
    #[arg(long, default_value_t = DEBOUNCE_DELAY.as_millis() as u64)]
    delay: u64,
}

/// Input to the watch loop
#[derive(Debug)]
pub enum Event {
    Edit { field: String, value: String },
    Rate(ExchangeRate),
    Eof,
}

impl WatchCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let (tx, rx) = mpsc::channel();

        spawn_rate_fetch(self.rate.clone(), tx.clone());
        spawn_stdin_reader(tx);

        println!("Enter field=value lines, e.g. uk_price=20000 (Ctrl-D to quit)");
        let fields: Vec<&str> = FormField::ALL.iter().map(|f| f.id()).collect();
        println!("Fields: {}", fields.join(", "));

        let mut form = EstimatorForm::new(Duration::from_millis(self.delay));
        run(&mut form, &rx, |line| println!("{}", line));
        Ok(())
    }
}

/// Fetch the rate in the background; the form works without it until it arrives
fn spawn_rate_fetch(rate: RateArgs, tx: Sender<Event>) {
    thread::spawn(move || {
        let event = match rate.resolve() {
            Ok(rate) => Event::Rate(rate),
            Err(e) => {
                log::warn!("{}; using fallback rate", e);
                Event::Rate(ExchangeRate::fallback())
            }
        };
        let _ = tx.send(event);
    });
}

fn spawn_stdin_reader(tx: Sender<Event>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if let Some(event) = parse_line(&line) {
                if tx.send(event).is_err() {
                    return;
                }
            }
        }
        let _ = tx.send(Event::Eof);
    });
}

/// Parse a `field=value` line. Blank lines are ignored.
pub fn parse_line(line: &str) -> Option<Event> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let (field, value) = line.split_once('=').unwrap_or((line, ""));
    Some(Event::Edit {
        field: field.trim().to_string(),
        value: value.trim().to_string(),
    })
}

/// Drive the form from `rx` until EOF, reporting output lines through `emit`
pub fn run(form: &mut EstimatorForm, rx: &Receiver<Event>, mut emit: impl FnMut(String)) {
    loop {
        let event = match form.deadline() {
            Some(deadline) => {
                let timeout = deadline.saturating_duration_since(Instant::now());
                match rx.recv_timeout(timeout) {
                    Ok(event) => Some(event),
                    Err(RecvTimeoutError::Timeout) => None,
                    Err(RecvTimeoutError::Disconnected) => Some(Event::Eof),
                }
            }
            None => Some(rx.recv().unwrap_or(Event::Eof)),
        };

        match event {
            Some(Event::Edit { field, value }) => handle_edit(form, &field, &value, &mut emit),
            Some(Event::Rate(rate)) => {
                emit(format!("Exchange rate: {}", rate.display()));
                form.apply_exchange_rate(rate);
            }
            Some(Event::Eof) => {
                // flush a pending recomputation before exiting
                if let Some(deadline) = form.deadline() {
                    if form.poll(deadline) {
                        emit_estimate(form, &mut emit);
                    }
                }
                emit_summary(form, &mut emit);
                return;
            }
            None => {
                if form.poll(Instant::now()) {
                    emit_estimate(form, &mut emit);
                }
            }
        }
    }
}

fn handle_edit(form: &mut EstimatorForm, field: &str, value: &str, emit: &mut impl FnMut(String)) {
    let Some(form_field) = FormField::from_id(field) else {
        emit(format!("\u{2717} Unknown field '{}'", field));
        return;
    };
    match form.set_field(form_field, value, Instant::now()) {
        FieldCheck::Valid => {}
        FieldCheck::Flagged(msg) => emit(format!("\u{26A0} {}", msg)),
        FieldCheck::Invalid(msg) => emit(format!("\u{2717} {}", msg)),
    }
    if form_field == FormField::Co2Emissions {
        if let Some(band) = form.rate_indicator() {
            emit(band.indicator());
        }
    }
}

fn emit_estimate(form: &EstimatorForm, emit: &mut impl FnMut(String)) {
    let Some(estimate) = form.estimate() else {
        return;
    };
    let duty = if estimate.import_origin.customs_duty_applies() {
        eur(estimate.customs_duty, 0)
    } else {
        "No duty".to_string()
    };
    emit(format!(
        "VRT ({}): {} | Duty: {} | VAT: {} | Total: {}",
        percent(estimate.vrt_rate),
        eur(estimate.vrt_amount, 0),
        duty,
        eur(estimate.vat_amount, 0),
        eur(estimate.total, 0),
    ));
}

fn emit_summary(form: &EstimatorForm, emit: &mut impl FnMut(String)) {
    let mut fields: Vec<String> = FormField::ALL
        .iter()
        .map(|f| format!("{}={}", f.id(), form.field(*f)))
        .collect();
    let rate = form
        .exchange_rate()
        .map(|r| r.display())
        .unwrap_or_else(|| "pending".to_string());
    fields.push(format!("rate={}", rate));
    emit(format!("Form: {}", fields.join(" ")));
    emit(format!(
        "{} estimate(s) computed; form {}",
        form.recomputations(),
        if form.can_submit() {
            "can be submitted"
        } else {
            "cannot be submitted"
        }
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn edit(field: &str, value: &str) -> Event {
        Event::Edit {
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    fn run_events(events: Vec<Event>) -> (EstimatorForm, Vec<String>) {
        let (tx, rx) = mpsc::channel();
        for event in events {
            tx.send(event).unwrap();
        }
        drop(tx);
        let mut form = EstimatorForm::new(Duration::from_secs(60));
        let mut output = Vec::new();
        run(&mut form, &rx, |line| output.push(line));
        (form, output)
    }

    #[test]
    fn parses_lines() {
        assert!(parse_line("   ").is_none());
        match parse_line(" uk_price = 20000 ") {
            Some(Event::Edit { field, value }) => {
                assert_eq!(field, "uk_price");
                assert_eq!(value, "20000");
            }
            other => panic!("unexpected {:?}", other),
        }
        match parse_line("vehicle_age") {
            Some(Event::Edit { field, value }) => {
                assert_eq!(field, "vehicle_age");
                assert_eq!(value, "");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn queued_edits_produce_one_estimate() {
        let (form, output) = run_events(vec![
            Event::Rate(ExchangeRate::manual(dec!(1.17))),
            edit("uk_price", "2"),
            edit("uk_price", "20000"),
            edit("co2_emissions", "120"),
            edit("import_origin", "ni"),
            Event::Eof,
        ]);
        assert_eq!(form.recomputations(), 1);
        assert_eq!(output[0], "Exchange rate: 1.1700");
        assert!(output.contains(&"VRT Rate: 16% - Higher emissions".to_string()));
        let estimate = &output[output.len() - 3];
        assert!(estimate.contains("Duty: No duty"), "{}", estimate);
        assert!(estimate.ends_with("Total: \u{20AC}33,364"), "{}", estimate);
        assert_eq!(
            output[output.len() - 2],
            "Form: uk_price=20000 co2_emissions=120 fuel_type=petrol vehicle_age= import_origin=ni rate=1.1700"
        );
        assert_eq!(output[output.len() - 1], "1 estimate(s) computed; form can be submitted");
    }

    #[test]
    fn reports_field_problems() {
        let (form, output) = run_events(vec![
            edit("colour", "red"),
            edit("uk_price", "1500000"),
            edit("co2_emissions", "600"),
            Event::Eof,
        ]);
        assert_eq!(output[0], "\u{2717} Unknown field 'colour'");
        assert_eq!(output[1], "\u{26A0} Price seems unusually high. Please verify.");
        assert!(output[2].starts_with('\u{2717}'));
        assert!(form.estimate().is_none());
        assert!(output[output.len() - 2].ends_with(" rate=pending"));
        assert_eq!(output.last().unwrap(), "0 estimate(s) computed; form cannot be submitted");
    }

    #[test]
    fn disconnect_ends_loop() {
        let (form, output) = run_events(vec![edit("uk_price", "20000")]);
        assert_eq!(output.len(), 2);
        assert!(form.estimate().is_none());
    }
}
