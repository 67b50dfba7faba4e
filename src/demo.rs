use crate::core::EntityType;
use crate::source::InMemoryArchiveBackend;
use chrono::{Duration, Utc};
use serde_json::{Value, json};

/// Fills `backend` with a few archived records of every entity type.
///
/// Archive times are relative to now so the date filters have something to match.
pub async fn seed_demo_archive(backend: &InMemoryArchiveBackend) {
    let now = Utc::now();
    let ago = |hours: i64| (now - Duration::hours(hours)).to_rfc3339();
    let admin = json!({"name": "Admin"});

    let fixtures: Vec<(EntityType, Value)> = vec![
        (
            EntityType::Customer,
            json!({
                "_id": "cus-1001",
                "fullName": "Sara Nabil",
                "email": "sara.nabil@example.com",
                "phone": "+20 100 555 0101",
                "source": "Facebook",
                "status": "Cold",
                "assignedTo": {"name": "Omar Hassan"},
                "budget": 2500000,
                "location": "New Cairo",
                "deletedAt": ago(2),
                "deletedBy": admin.clone(),
                "deleteReason": "Duplicate profile"
            }),
        ),
        (
            EntityType::Customer,
            json!({
                "_id": "cus-1002",
                "firstName": "Youssef",
                "lastName": "Kamal",
                "phoneNumber": "+20 122 000 7788",
                "deletedAt": ago(200)
            }),
        ),
        (
            EntityType::Prospect,
            json!({
                "_id": "lead-2001",
                "name": "Mariam Fathy",
                "email": "mariam@example.com",
                "source": "Website",
                "status": "Contacted",
                "interestedIn": "Twin house",
                "budget": "4,000,000",
                "deletedAt": ago(30),
                "deletedBy": {"firstName": "Hany", "lastName": "Fouad"},
                "deleteReason": "Not interested"
            }),
        ),
        (
            EntityType::Deal,
            json!({
                "_id": "deal-3001",
                "client": {"fullName": "Karim Saad", "email": "karim@example.com", "phone": "+20 111 222 3333"},
                "unit": {"unitNumber": "B-204"},
                "amount": 3400000,
                "stage": "Negotiation",
                "paymentMethod": "Installments",
                "deletedAt": ago(5),
                "deletedBy": admin.clone()
            }),
        ),
        (
            EntityType::Project,
            json!({
                "_id": "prj-4001",
                "projectName": "Palm Residence",
                "developer": {"name": "Palm Developments"},
                "location": "Sheikh Zayed",
                "type": "Residential",
                "status": "Under construction",
                "totalUnits": 320,
                "deliveryDate": "2027-06-30",
                "archivedAt": ago(400),
                "archiveReason": "Project cancelled"
            }),
        ),
        (
            EntityType::InventoryUnit,
            json!({
                "_id": "unit-5001",
                "unitCode": "A-12",
                "project": {"name": "Palm Residence"},
                "floor": 3,
                "area": 145,
                "rooms": 3,
                "bathrooms": 2,
                "price": 5100000,
                "status": "Available",
                "deletedAt": ago(72)
            }),
        ),
        (
            EntityType::PartnerOrganization,
            json!({
                "_id": "dev-6001",
                "companyName": "Nile Builders",
                "email": "info@nilebuilders.example",
                "type": "Developer",
                "contactPerson": {"fullName": "Ahmed Samir"},
                "website": "https://nilebuilders.example",
                "deletedAt": ago(600)
            }),
        ),
        (
            EntityType::FollowUpTask,
            json!({
                "_id": "fu-7001",
                "customer": {"fullName": "Sara Nabil", "phone": "+20 100 555 0101"},
                "dueDate": "2024-07-10",
                "priority": "High",
                "status": "Pending",
                "deletedAt": ago(1)
            }),
        ),
        (
            EntityType::TodoItem,
            json!({
                "_id": "todo-8001",
                "title": "Send brochure",
                "completed": false,
                "category": "Marketing"
            }),
        ),
        (
            EntityType::ScheduledReminder,
            json!({
                "_id": "rem-9001",
                "message": "Call back about payment plan",
                "remindAt": ago(-24),
                "relatedTo": {"fullName": "Karim Saad"},
                "repeat": "weekly",
                "deletedAt": ago(10),
                "deletedBy": admin
            }),
        ),
    ];

    for (entity_type, raw) in fixtures {
        backend.insert(entity_type, raw).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn demo_seed_covers_every_entity_type() {
        let backend = InMemoryArchiveBackend::new();
        seed_demo_archive(&backend).await;
        for entity_type in EntityType::ALL {
            assert!(
                !backend.archived_ids(entity_type).await.is_empty(),
                "no demo record for {entity_type}"
            );
        }
    }
}
