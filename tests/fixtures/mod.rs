//! Seed data for database-backed tests

use chrono::{Duration, NaiveDate, Utc};

use ChurchHub::database::DatabaseService;
use ChurchHub::models::{
    CreateEventRequest, CreateGroupRequest, CreateMemberRequest, Event, Group, GroupKind, Member,
};

/// Rows created by [`seed`]
pub struct Seeded {
    pub youth: Group,
    pub worship: Group,
    pub ada: Member,
    pub grace: Member,
    pub sunday_service: Event,
}

pub fn group_request(name: &str, kind: GroupKind) -> CreateGroupRequest {
    CreateGroupRequest {
        name: name.to_string(),
        description: None,
        kind,
        category: None,
        leader_id: None,
        meeting_day: None,
        meeting_time: None,
        location: None,
    }
}

pub fn member_request(first_name: &str, last_name: &str, email: &str) -> CreateMemberRequest {
    CreateMemberRequest {
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        email: email.to_string(),
        phone: None,
        role: None,
        permissions: None,
        cell_group_id: None,
    }
}

pub fn event_request(name: &str, event_date: NaiveDate) -> CreateEventRequest {
    CreateEventRequest {
        name: name.to_string(),
        topic: None,
        event_date,
        event_time: None,
        location: Some("Main Hall".to_string()),
        category: Some("Service".to_string()),
        expected_attendees: Some(120),
        group_id: None,
    }
}

/// Two groups, two members and an event next week
pub async fn seed(database: &DatabaseService) -> Seeded {
    let youth = database.groups
        .create(group_request("Youth Cell", GroupKind::Cell))
        .await
        .expect("create youth group");
    let worship = database.groups
        .create(group_request("Worship Team", GroupKind::Ministry))
        .await
        .expect("create worship group");

    let mut ada = member_request("Ada", "Lovelace", "ada@example.org");
    ada.cell_group_id = Some(youth.id);
    ada.phone = Some("555-0101".to_string());
    let ada = database.members.create(ada).await.expect("create ada");

    let grace = database.members
        .create(member_request("Grace", "Hopper", "grace@example.org"))
        .await
        .expect("create grace");

    let next_week = Utc::now().date_naive() + Duration::days(7);
    let sunday_service = database.events
        .create(event_request("Sunday Service", next_week))
        .await
        .expect("create event");

    Seeded { youth, worship, ada, grace, sunday_service }
}
