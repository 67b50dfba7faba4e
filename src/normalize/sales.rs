use super::RecordDraft;
use super::fields::{
    ArchiveMeta, Lenient, PartyRef, Scalar, date, decode, first_party, first_text, money, party,
    party_name, party_profile, scalar, text,
};
use crate::core::EntityType;
use crate::model::ArchivedRecord;
use serde::Deserialize;
use serde_json::Value;

pub(super) const DEAL_ATTRIBUTES: &[&str] = &[
    "Client",
    "Unit",
    "Amount",
    "Stage",
    "Payment Method",
    "Assigned To",
];

pub(super) const PROJECT_ATTRIBUTES: &[&str] = &[
    "Developer",
    "Location",
    "Type",
    "Status",
    "Units",
    "Delivery Date",
];

pub(super) const UNIT_ATTRIBUTES: &[&str] = &[
    "Project",
    "Floor",
    "Area",
    "Rooms",
    "Bathrooms",
    "Price",
    "Status",
];

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawDeal {
    client: Lenient<PartyRef>,
    customer: Lenient<PartyRef>,
    lead: Lenient<PartyRef>,
    unit: Lenient<PartyRef>,
    amount: Lenient<Scalar>,
    deal_value: Lenient<Scalar>,
    price: Lenient<Scalar>,
    stage: Lenient<String>,
    status: Lenient<String>,
    payment_method: Lenient<String>,
    payment_type: Lenient<String>,
    assigned_to: Lenient<PartyRef>,
    sales_agent: Lenient<PartyRef>,
    #[serde(flatten)]
    meta: ArchiveMeta,
}

/// Deals carry no name of their own; they are shown by client.
pub(super) fn deal(raw: &Value) -> ArchivedRecord {
    let raw: RawDeal = decode(raw);
    let client = first_party([&raw.client, &raw.customer, &raw.lead])
        .cloned()
        .unwrap_or_default();
    let client_profile = party_profile(&client);

    RecordDraft::new(EntityType::Deal, &raw.meta)
        .name(party_name(&client).map(|name| format!("Deal with {}", name)))
        .contact(
            client_profile.and_then(|profile| profile.email()),
            client_profile.and_then(|profile| profile.phone()),
        )
        .finish([
            party(&client),
            party(&raw.unit),
            first_text([money(&raw.amount), money(&raw.deal_value), money(&raw.price)]),
            first_text([text(&raw.stage), text(&raw.status)]),
            first_text([text(&raw.payment_method), text(&raw.payment_type)]),
            first_text([party(&raw.assigned_to), party(&raw.sales_agent)]),
        ])
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawProject {
    name: Lenient<String>,
    project_name: Lenient<String>,
    title: Lenient<String>,
    developer: Lenient<PartyRef>,
    location: Lenient<String>,
    #[serde(rename = "type")]
    kind: Lenient<String>,
    project_type: Lenient<String>,
    status: Lenient<String>,
    total_units: Lenient<Scalar>,
    units_count: Lenient<Scalar>,
    delivery_date: Lenient<Scalar>,
    handover_date: Lenient<Scalar>,
    #[serde(flatten)]
    meta: ArchiveMeta,
}

pub(super) fn project(raw: &Value) -> ArchivedRecord {
    let raw: RawProject = decode(raw);
    RecordDraft::new(EntityType::Project, &raw.meta)
        .name(first_text([
            text(&raw.name),
            text(&raw.project_name),
            text(&raw.title),
        ]))
        .finish([
            party(&raw.developer),
            text(&raw.location),
            first_text([text(&raw.kind), text(&raw.project_type)]),
            text(&raw.status),
            first_text([scalar(&raw.total_units), scalar(&raw.units_count)]),
            first_text([date(&raw.delivery_date), date(&raw.handover_date)]),
        ])
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawUnit {
    unit_code: Lenient<Scalar>,
    unit_number: Lenient<Scalar>,
    code: Lenient<Scalar>,
    project: Lenient<PartyRef>,
    floor: Lenient<Scalar>,
    area: Lenient<Scalar>,
    rooms: Lenient<Scalar>,
    bedrooms: Lenient<Scalar>,
    bathrooms: Lenient<Scalar>,
    price: Lenient<Scalar>,
    status: Lenient<String>,
    #[serde(flatten)]
    meta: ArchiveMeta,
}

/// Units are named by code, or by their project when the code is missing.
pub(super) fn unit(raw: &Value) -> ArchivedRecord {
    let raw: RawUnit = decode(raw);
    let code = first_text([
        scalar(&raw.unit_code),
        scalar(&raw.unit_number),
        scalar(&raw.code),
    ]);
    let project_name = party_name(&raw.project);
    let display_name = match (code, project_name) {
        (Some(code), Some(project)) => Some(format!("Unit {} - {}", code, project)),
        (Some(code), None) => Some(format!("Unit {}", code)),
        (None, Some(project)) => Some(format!("Unit in {}", project)),
        (None, None) => None,
    };

    RecordDraft::new(EntityType::InventoryUnit, &raw.meta)
        .name(display_name)
        .finish([
            party(&raw.project),
            scalar(&raw.floor),
            scalar(&raw.area).map(|area| format!("{} m²", area)),
            first_text([scalar(&raw.rooms), scalar(&raw.bedrooms)]),
            scalar(&raw.bathrooms),
            money(&raw.price),
            text(&raw.status),
        ])
}
