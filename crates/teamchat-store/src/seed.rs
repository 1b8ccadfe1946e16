//! Demo data used whenever a persisted record is missing or unreadable.

use chrono::{DateTime, Duration, Utc};

use teamchat_shared::constants::{DEFAULT_COMPANY_DESCRIPTION, DEFAULT_COMPANY_NAME};
use teamchat_shared::{GroupId, MessageId, MessageKind, Presence, Role, UserId};

use crate::models::{CompanySettings, Destination, Group, Message, User};

pub fn default_users(now: DateTime<Utc>) -> Vec<User> {
    let user = |id, name: &str, phone: &str, role, status, avatar: &str, last_seen| User {
        id: UserId(id),
        name: name.to_string(),
        phone: phone.to_string(),
        role,
        status,
        avatar: avatar.to_string(),
        last_seen,
    };

    vec![
        user(1, "John Admin", "+1234567890", Role::Admin, Presence::Online, "👨‍💼", now),
        user(2, "Sarah Manager", "+1234567891", Role::User, Presence::Online, "👩‍💼", now),
        user(3, "Mike Developer", "+1234567892", Role::User, Presence::Away, "👨‍💻", now),
        user(4, "Lisa Designer", "+1234567893", Role::User, Presence::Online, "👩‍🎨", now),
        user(
            5,
            "Tom Support",
            "+1234567894",
            Role::User,
            Presence::Offline,
            "👨‍🔧",
            now - Duration::hours(1),
        ),
    ]
}

pub fn default_groups() -> Vec<Group> {
    vec![
        Group {
            id: GroupId(1),
            name: "Development Team".to_string(),
            members: vec![UserId(1), UserId(3), UserId(4)],
            admin: UserId(1),
            avatar: "👥".to_string(),
            description: "Main development team discussions".to_string(),
        },
        Group {
            id: GroupId(2),
            name: "Management".to_string(),
            members: vec![UserId(1), UserId(2)],
            admin: UserId(1),
            avatar: "🏢".to_string(),
            description: "Management coordination".to_string(),
        },
    ]
}

pub fn default_messages(now: DateTime<Utc>) -> Vec<Message> {
    let msg = |id, sender, destination, content: &str, minutes_ago| Message {
        id: MessageId(id),
        sender_id: UserId(sender),
        destination,
        content: content.to_string(),
        timestamp: now - Duration::minutes(minutes_ago),
        kind: MessageKind::Text,
    };

    vec![
        msg(
            1,
            2,
            Destination::User(UserId(1)),
            "Good morning John! Ready for today's demo? 🌟",
            5,
        ),
        msg(
            2,
            1,
            Destination::User(UserId(2)),
            "Absolutely Sarah! The new features are looking great 👍",
            4,
        ),
        msg(
            3,
            3,
            Destination::User(UserId(1)),
            "Latest build is ready for testing @John Admin",
            3,
        ),
        msg(
            4,
            4,
            Destination::Group(GroupId(1)),
            "Updated the design assets in the shared folder 🎨",
            2,
        ),
        msg(
            5,
            1,
            Destination::Group(GroupId(1)),
            "Excellent work everyone! This release is going to be amazing 🚀",
            1,
        ),
    ]
}

pub fn default_company() -> CompanySettings {
    CompanySettings {
        name: DEFAULT_COMPANY_NAME.to_string(),
        logo: None,
        description: DEFAULT_COMPANY_DESCRIPTION.to_string(),
    }
}
