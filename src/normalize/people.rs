use super::RecordDraft;
use super::fields::{
    ArchiveMeta, Lenient, PartyRef, Scalar, decode, first_text, join_name, money, party, scalar,
    text,
};
use crate::core::EntityType;
use crate::model::ArchivedRecord;
use serde::Deserialize;
use serde_json::Value;

pub(super) const CUSTOMER_ATTRIBUTES: &[&str] = &[
    "Source",
    "Status",
    "Assigned To",
    "Budget",
    "Location",
    "Notes",
];

pub(super) const PROSPECT_ATTRIBUTES: &[&str] =
    &["Source", "Status", "Interest", "Budget", "Assigned To"];

pub(super) const PARTNER_ATTRIBUTES: &[&str] =
    &["Type", "Contact Person", "Address", "Website", "Status"];

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawCustomer {
    full_name: Lenient<String>,
    name: Lenient<String>,
    first_name: Lenient<String>,
    last_name: Lenient<String>,
    email: Lenient<String>,
    phone: Lenient<Scalar>,
    phone_number: Lenient<Scalar>,
    source: Lenient<String>,
    lead_source: Lenient<String>,
    status: Lenient<String>,
    assigned_to: Lenient<PartyRef>,
    budget: Lenient<Scalar>,
    location: Lenient<String>,
    city: Lenient<String>,
    notes: Lenient<String>,
    #[serde(flatten)]
    meta: ArchiveMeta,
}

pub(super) fn customer(raw: &Value) -> ArchivedRecord {
    let raw: RawCustomer = decode(raw);
    RecordDraft::new(EntityType::Customer, &raw.meta)
        .name(first_text([
            text(&raw.full_name),
            text(&raw.name),
            join_name(&raw.first_name, &raw.last_name),
        ]))
        .contact(
            text(&raw.email),
            first_text([scalar(&raw.phone), scalar(&raw.phone_number)]),
        )
        .finish([
            first_text([text(&raw.source), text(&raw.lead_source)]),
            text(&raw.status),
            party(&raw.assigned_to),
            money(&raw.budget),
            first_text([text(&raw.location), text(&raw.city)]),
            text(&raw.notes),
        ])
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawProspect {
    name: Lenient<String>,
    full_name: Lenient<String>,
    first_name: Lenient<String>,
    last_name: Lenient<String>,
    email: Lenient<String>,
    phone: Lenient<Scalar>,
    mobile: Lenient<Scalar>,
    source: Lenient<String>,
    status: Lenient<String>,
    interest: Lenient<String>,
    interested_in: Lenient<String>,
    property_type: Lenient<String>,
    budget: Lenient<Scalar>,
    assigned_to: Lenient<PartyRef>,
    #[serde(flatten)]
    meta: ArchiveMeta,
}

pub(super) fn prospect(raw: &Value) -> ArchivedRecord {
    let raw: RawProspect = decode(raw);
    RecordDraft::new(EntityType::Prospect, &raw.meta)
        .name(first_text([
            text(&raw.name),
            text(&raw.full_name),
            join_name(&raw.first_name, &raw.last_name),
        ]))
        .contact(
            text(&raw.email),
            first_text([scalar(&raw.phone), scalar(&raw.mobile)]),
        )
        .finish([
            text(&raw.source),
            text(&raw.status),
            first_text([
                text(&raw.interest),
                text(&raw.interested_in),
                text(&raw.property_type),
            ]),
            money(&raw.budget),
            party(&raw.assigned_to),
        ])
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawPartner {
    name: Lenient<String>,
    company_name: Lenient<String>,
    email: Lenient<String>,
    phone: Lenient<Scalar>,
    #[serde(rename = "type")]
    kind: Lenient<String>,
    partner_type: Lenient<String>,
    contact_person: Lenient<PartyRef>,
    address: Lenient<String>,
    location: Lenient<String>,
    website: Lenient<String>,
    status: Lenient<String>,
    #[serde(flatten)]
    meta: ArchiveMeta,
}

pub(super) fn partner(raw: &Value) -> ArchivedRecord {
    let raw: RawPartner = decode(raw);
    RecordDraft::new(EntityType::PartnerOrganization, &raw.meta)
        .name(first_text([text(&raw.name), text(&raw.company_name)]))
        .contact(text(&raw.email), scalar(&raw.phone))
        .finish([
            first_text([text(&raw.kind), text(&raw.partner_type)]),
            party(&raw.contact_person),
            first_text([text(&raw.address), text(&raw.location)]),
            text(&raw.website),
            text(&raw.status),
        ])
}
