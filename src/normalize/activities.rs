use super::RecordDraft;
use super::fields::{
    ArchiveMeta, Lenient, PartyRef, Scalar, date, date_time, decode, first_party, first_text,
    party, party_name, party_profile, scalar, text,
};
use crate::core::EntityType;
use crate::model::ArchivedRecord;
use serde::Deserialize;
use serde_json::Value;

pub(super) const FOLLOW_UP_ATTRIBUTES: &[&str] =
    &["Customer", "Due Date", "Priority", "Status", "Assigned To"];

pub(super) const TODO_ATTRIBUTES: &[&str] = &["Due Date", "Priority", "Status", "Category"];

pub(super) const REMINDER_ATTRIBUTES: &[&str] = &["Remind At", "Related To", "Repeat", "Status"];

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawFollowUp {
    title: Lenient<String>,
    subject: Lenient<String>,
    customer: Lenient<PartyRef>,
    lead: Lenient<PartyRef>,
    due_date: Lenient<Scalar>,
    follow_up_date: Lenient<Scalar>,
    priority: Lenient<String>,
    status: Lenient<String>,
    assigned_to: Lenient<PartyRef>,
    #[serde(flatten)]
    meta: ArchiveMeta,
}

pub(super) fn follow_up(raw: &Value) -> ArchivedRecord {
    let raw: RawFollowUp = decode(raw);
    let party_field = first_party([&raw.customer, &raw.lead]).unwrap_or(&raw.customer);
    let profile = party_profile(party_field);

    RecordDraft::new(EntityType::FollowUpTask, &raw.meta)
        .name(first_text([
            text(&raw.title),
            text(&raw.subject),
            party_name(party_field).map(|name| format!("Follow-up with {}", name)),
        ]))
        .contact(
            profile.and_then(|profile| profile.email()),
            profile.and_then(|profile| profile.phone()),
        )
        .finish([
            party(party_field),
            first_text([date(&raw.due_date), date(&raw.follow_up_date)]),
            text(&raw.priority),
            text(&raw.status),
            party(&raw.assigned_to),
        ])
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawTodo {
    title: Lenient<String>,
    text: Lenient<String>,
    description: Lenient<String>,
    due_date: Lenient<Scalar>,
    priority: Lenient<String>,
    status: Lenient<String>,
    completed: Lenient<bool>,
    category: Lenient<String>,
    #[serde(flatten)]
    meta: ArchiveMeta,
}

pub(super) fn todo(raw: &Value) -> ArchivedRecord {
    let raw: RawTodo = decode(raw);
    let completion = raw
        .completed
        .get()
        .map(|done| if *done { "Completed" } else { "Pending" }.to_string());

    RecordDraft::new(EntityType::TodoItem, &raw.meta)
        .name(first_text([
            text(&raw.title),
            text(&raw.text),
            text(&raw.description),
        ]))
        .finish([
            date(&raw.due_date),
            text(&raw.priority),
            first_text([text(&raw.status), completion]),
            text(&raw.category),
        ])
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawReminder {
    title: Lenient<String>,
    message: Lenient<String>,
    note: Lenient<String>,
    remind_at: Lenient<Scalar>,
    reminder_date: Lenient<Scalar>,
    date: Lenient<Scalar>,
    related_to: Lenient<PartyRef>,
    customer: Lenient<PartyRef>,
    repeat: Lenient<Scalar>,
    recurrence: Lenient<String>,
    status: Lenient<String>,
    #[serde(flatten)]
    meta: ArchiveMeta,
}

pub(super) fn reminder(raw: &Value) -> ArchivedRecord {
    let raw: RawReminder = decode(raw);
    RecordDraft::new(EntityType::ScheduledReminder, &raw.meta)
        .name(first_text([
            text(&raw.title),
            text(&raw.message),
            text(&raw.note),
        ]))
        .finish([
            first_text([
                date_time(&raw.remind_at),
                date_time(&raw.reminder_date),
                date_time(&raw.date),
            ]),
            first_text([party(&raw.related_to), party(&raw.customer)]),
            first_text([scalar(&raw.repeat), text(&raw.recurrence)]),
            text(&raw.status),
        ])
}
