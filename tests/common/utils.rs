use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Local, TimeZone};
use form_relay::{
    form::schema::FormSchema,
    pipeline::{
        assembler::Clock,
        controller::PostSubmissionController,
        dispatcher::Dispatcher,
        handoff::{PaymentDestination, RecordingHandoff},
        pipeline::FormPipeline,
    },
    transport::{form_post::RecordingPostTransport, webhook::MockAckTransport},
};

/// Example lead from the product brief.
pub fn lead_values() -> Vec<(&'static str, &'static str)> {
    vec![
        ("Name", "A"),
        ("Phone", "9999999999"),
        ("Service", "Support"),
        ("City", "Pune"),
        ("email", "a@b.com"),
        ("Preferred Date", "2025-11-02"),
    ]
}

pub fn registration_values() -> Vec<(&'static str, &'static str)> {
    vec![
        ("examMode", "Offline"),
        ("fullName", "Asha Verma"),
        ("email", "asha@example.com"),
        ("phone", "9876543210"),
        ("whatsapp", "9876543211"),
        ("dateOfBirth", "2010-04-12"),
        ("gender", "Female"),
        ("address", "12 MG Road"),
        ("city", "Pune"),
        ("state", "Maharashtra"),
        ("pincode", "411001"),
        ("class", "10"),
        ("stream", "N/A"),
        ("schoolName", "City High School"),
        ("schoolBoard", "CBSE"),
        ("previousPercentage", "91.5"),
        ("examDate", "2025-11-09"),
    ]
}

/// Clock that advances one second on every read.
pub struct SteppingClock {
    next: Mutex<DateTime<Local>>,
}

impl SteppingClock {
    pub fn starting_at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> Self {
        let start = Local
            .with_ymd_and_hms(y, mo, d, h, mi, s)
            .single()
            .expect("unambiguous local time");
        Self {
            next: Mutex::new(start),
        }
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> DateTime<Local> {
        let mut next = self.next.lock().unwrap();
        let now = *next;
        *next = now + chrono::Duration::seconds(1);
        now
    }
}

pub fn recording_controller(delay_ms: u64) -> (PostSubmissionController, RecordingHandoff) {
    let handoff = RecordingHandoff::new();
    let controller = PostSubmissionController::new(
        PaymentDestination::default(),
        Duration::from_millis(delay_ms),
        Arc::new(handoff.clone()),
    );
    (controller, handoff)
}

pub fn lead_pipeline(transport: &MockAckTransport) -> FormPipeline {
    let (controller, _) = recording_controller(10);
    FormPipeline::new(
        FormSchema::lead(),
        Dispatcher::Acknowledged(Box::new(transport.clone())),
        controller,
    )
    .unwrap()
}

pub fn registration_pipeline(
    transport: &RecordingPostTransport,
    delay_ms: u64,
) -> (FormPipeline, RecordingHandoff) {
    let (controller, handoff) = recording_controller(delay_ms);
    let pipeline = FormPipeline::new(
        FormSchema::registration(),
        Dispatcher::FireAndForget(Box::new(transport.clone())),
        controller,
    )
    .unwrap()
    .with_clock(Box::new(SteppingClock::starting_at(2025, 11, 2, 15, 4, 5)));
    (pipeline, handoff)
}
