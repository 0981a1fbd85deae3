//! Developer teams owning applications.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::base::{image_ext, update_field};
use super::{flatten, Context, Entity, Mention, TeamId, User, UserData, UserId};

open_enum! {
/// Whether a team member accepted their invitation.
pub enum MembershipState {
    /// The user was invited and did not accept yet.
    Invited = 1,
    /// The user is a member of the team.
    Accepted = 2,
}
}

/// The raw payload of a team member.
#[derive(Debug, Clone, Deserialize)]
pub struct TeamMemberData {
    /// Whether the user accepted their invitation.
    pub membership_state: MembershipState,
    /// The team the user is a member of.
    pub team_id: TeamId,
    /// The user.
    pub user: UserData,
    /// The role of the member: `admin`, `developer` or `read_only`.
    #[serde(default)]
    pub role: String,
    /// Always `["*"]`.
    #[serde(default)]
    pub permissions: Vec<String>,
}

/// A member of a team.
#[derive(Debug, Clone, Serialize)]
pub struct TeamMember {
    /// The team the user is a member of.
    pub team_id: TeamId,
    /// Whether the user accepted their invitation.
    pub membership_state: MembershipState,
    /// The role of the member.
    pub role: String,
    /// Always `["*"]`.
    pub permissions: Vec<String>,
    /// The user.
    pub user: User,
}

impl TeamMember {
    fn new(data: &TeamMemberData) -> Self {
        TeamMember {
            team_id: data.team_id,
            membership_state: data.membership_state,
            role: data.role.clone(),
            permissions: data.permissions.clone(),
            user: User::new(&data.user),
        }
    }

    fn patch(&mut self, data: &TeamMemberData) {
        self.membership_state = data.membership_state;
        self.role = data.role.clone();
        self.permissions = data.permissions.clone();
        self.user.patch(&data.user);
    }

    /// The ID of the member's user.
    pub fn id(&self) -> UserId {
        self.user.id
    }

    /// Return a `Mention` which will ping this member.
    pub fn mention(&self) -> Mention {
        self.user.mention()
    }
}

impl fmt::Display for TeamMember {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.mention(), f)
    }
}

/// The raw payload of a team.
///
/// https://discord.com/developers/docs/topics/teams#data-models-team-object
#[derive(Debug, Clone, Deserialize)]
#[allow(missing_docs)]
pub struct TeamData {
    pub id: TeamId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "crate::serial::nullable")]
    pub icon: Option<Option<String>>,
    #[serde(default)]
    pub owner_user_id: Option<UserId>,
    #[serde(default)]
    pub members: Option<Vec<TeamMemberData>>,
}

/// A team of developers owning applications.
#[derive(Debug, Clone, Serialize)]
pub struct Team {
    /// The ID of the team.
    pub id: TeamId,
    /// The name of the team.
    pub name: String,
    /// The icon hash of the team.
    pub icon: Option<String>,
    /// The user owning the team.
    pub owner_user_id: Option<UserId>,
    /// The members of the team, owned by it.
    pub members: Vec<TeamMember>,
}

impl Entity for Team {
    type Data = TeamData;

    fn from_data(_: &Context, data: &TeamData) -> Self {
        let mut team = Team {
            id: data.id,
            name: String::new(),
            icon: None,
            owner_user_id: None,
            members: Vec::new(),
        };
        team.patch(data);
        team
    }

    fn patch(&mut self, data: &TeamData) {
        update_field(&mut self.name, &data.name);
        if let Some(ref icon) = data.icon {
            self.icon = icon.clone();
        }
        if let Some(owner) = data.owner_user_id {
            self.owner_user_id = Some(owner);
        }
        if let Some(ref members) = data.members {
            self.members = members
                .iter()
                .map(|member| match self.member(member.user.id) {
                    Some(existing) => {
                        let mut existing = existing.clone();
                        existing.patch(member);
                        existing
                    }
                    None => TeamMember::new(member),
                })
                .collect();
        }
    }

    fn to_json(&self) -> Value {
        flatten(
            self,
            [
                ("created_timestamp", json!(self.id.timestamp())),
                ("icon_url", json!(self.icon_url())),
            ],
        )
    }
}

impl Team {
    /// Look up a member by user ID.
    pub fn member(&self, id: UserId) -> Option<&TeamMember> {
        self.members.iter().find(|member| member.id() == id)
    }

    /// The member owning the team.
    pub fn owner(&self) -> Option<&TeamMember> {
        self.owner_user_id.and_then(|id| self.member(id))
    }

    /// Returns the formatted URL of the team's icon.
    pub fn icon_url(&self) -> Option<String> {
        self.icon.as_ref().map(|hash| {
            format!(cdn_concat!("/team-icons/{}/{}.{}"), self.id, hash, image_ext(hash))
        })
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, Rest, Result};
    use crate::rest::RestRequest;
    use futures::future::BoxFuture;

    #[derive(Debug)]
    struct Offline;

    impl Rest for Offline {
        fn request(&self, _: RestRequest) -> BoxFuture<'_, Result<Option<Value>>> {
            Box::pin(async { Err(Error::Other("offline")) })
        }
    }

    #[test]
    fn unknown_membership_states_are_kept() {
        let data: TeamMemberData = serde_json::from_value(json!({
            "membership_state": 5,
            "team_id": "531992624043786253",
            "user": { "id": "511972282709709995", "username": "Mr Owner" },
        }))
        .unwrap();
        assert_eq!(data.membership_state, MembershipState::Unknown(5));
        assert_eq!(u8::from(MembershipState::Accepted), 2);
    }

    #[test]
    fn owner_and_members() {
        let data: TeamData = serde_json::from_value(json!({
            "id": "531992624043786253",
            "name": "Dream Team",
            "icon": "dd9b7dcfdf5351b9c3de0fe167bacbe1",
            "owner_user_id": "511972282709709995",
            "members": [
                {
                    "membership_state": 2,
                    "permissions": ["*"],
                    "role": "admin",
                    "team_id": "531992624043786253",
                    "user": { "id": "511972282709709995", "username": "Mr Mittens", "discriminator": "0", "avatar": null },
                },
                {
                    "membership_state": 1,
                    "permissions": ["*"],
                    "role": "developer",
                    "team_id": "531992624043786253",
                    "user": { "id": "80351110224678912", "username": "Nelly", "discriminator": "0" },
                },
            ],
        }))
        .unwrap();
        let mut team = Team::from_data(&Context::new(Offline), &data);

        assert_eq!(team.to_string(), "Dream Team");
        assert_eq!(team.owner().map(|m| m.role.as_str()), Some("admin"));
        assert_eq!(team.owner().map(|m| m.to_string()).as_deref(), Some("<@511972282709709995>"));
        assert_eq!(
            team.icon_url().as_deref(),
            Some("https://cdn.discordapp.com/team-icons/531992624043786253/dd9b7dcfdf5351b9c3de0fe167bacbe1.png")
        );
        assert_eq!(
            team.member(UserId(80351110224678912)).map(|m| m.membership_state),
            Some(MembershipState::Invited)
        );

        team.patch(&serde_json::from_value(json!({ "id": "531992624043786253", "icon": null })).unwrap());
        assert_eq!(team.icon_url(), None);
        assert_eq!(team.members.len(), 2);
        assert_eq!(team.name, "Dream Team");
    }
}
