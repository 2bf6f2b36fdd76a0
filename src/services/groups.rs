//! Study groups, membership and invite codes.
use super::require_text;
use crate::backend::{Query, SupabaseClient};
use crate::constants::{GROUP_MEMBERS_TABLE, INVITES_TABLE, INVITE_EXPIRY_DAYS, STUDY_GROUPS_TABLE};
use crate::error::{AppError, AppResult};
use crate::models::{GroupMember, Invite, MemberRole, StudyGroup};
use crate::utils::invite::{generate_invite_code, is_valid_format, normalize_invite_code};
use crate::utils::time::parse_timestamp;
use chrono::{Duration, Utc};

pub struct GroupService;

impl GroupService {
    /// Create a group with a fresh invite code and make `owner_id` its owner.
    pub async fn create_group(
        client: &SupabaseClient,
        owner_id: &str,
        name: &str,
        description: Option<&str>,
        subject: Option<&str>,
    ) -> AppResult<StudyGroup> {
        require_text(Some(name), "Group name")?;

        let row = StudyGroup {
            name: Some(name.trim().to_string()),
            description: description.map(String::from),
            subject: subject.map(String::from),
            owner_id: Some(owner_id.to_string()),
            invite_code: Some(generate_invite_code()),
            ..Default::default()
        };
        let group = client.insert(STUDY_GROUPS_TABLE, &row).await?;
        let group_id = group
            .id
            .clone()
            .ok_or_else(|| AppError::NotFound("Created group has no id".to_string()))?;

        if let Err(e) = Self::add_member(client, &group_id, owner_id, MemberRole::Owner).await {
            log::warn!("Owner membership failed, removing group {}: {}", group_id, e);
            if let Err(cleanup) = client
                .delete(STUDY_GROUPS_TABLE, &Query::new().eq("id", &group_id))
                .await
            {
                log::error!("Failed to remove group {}: {}", group_id, cleanup);
            }
            return Err(e);
        }
        log::info!("Created study group {} owned by {}", group_id, owner_id);
        Ok(group)
    }

    async fn add_member(
        client: &SupabaseClient,
        group_id: &str,
        user_id: &str,
        role: MemberRole,
    ) -> AppResult<GroupMember> {
        let member = GroupMember {
            group_id: Some(group_id.to_string()),
            user_id: Some(user_id.to_string()),
            role: Some(role.as_str().to_string()),
            ..Default::default()
        };
        client.insert(GROUP_MEMBERS_TABLE, &member).await
    }

    pub async fn get_group(client: &SupabaseClient, group_id: &str) -> AppResult<Option<StudyGroup>> {
        client
            .select_one(STUDY_GROUPS_TABLE, &Query::new().eq("id", group_id))
            .await
    }

    /// Resolve a code to a group: the group's own code first, then unexpired invites.
    pub async fn find_group_by_code(client: &SupabaseClient, code: &str) -> AppResult<StudyGroup> {
        if let Some(group) = client
            .select_one::<StudyGroup>(STUDY_GROUPS_TABLE, &Query::new().eq("invite_code", code))
            .await?
        {
            return Ok(group);
        }

        let invite: Invite = client
            .select_one(INVITES_TABLE, &Query::new().eq("code", code))
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No group uses invite code {}", code)))?;

        if let Some(expires_at) = invite.expires_at.as_deref().and_then(parse_timestamp) {
            if expires_at <= Utc::now() {
                return Err(AppError::InvalidInput("Invite code has expired".to_string()));
            }
        }

        let group_id = invite
            .group_id
            .ok_or_else(|| AppError::NotFound("Invite is not linked to a group".to_string()))?;
        Self::get_group(client, &group_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Group {}", group_id)))
    }

    /// Join the group behind `raw_code` as a regular member.
    pub async fn join_group_by_code(
        client: &SupabaseClient,
        user_id: &str,
        raw_code: &str,
    ) -> AppResult<StudyGroup> {
        let code = normalize_invite_code(raw_code);
        if !is_valid_format(&code) {
            return Err(AppError::InvalidInput(format!("Invalid invite code: {}", raw_code)));
        }

        let group = Self::find_group_by_code(client, &code).await?;
        let group_id = group
            .id
            .clone()
            .ok_or_else(|| AppError::NotFound("Group has no id".to_string()))?;

        if Self::member_role(client, &group_id, user_id).await?.is_some() {
            return Err(AppError::InvalidInput(
                "You are already a member of this group".to_string(),
            ));
        }

        Self::add_member(client, &group_id, user_id, MemberRole::Member).await?;
        log::info!("User {} joined group {}", user_id, group_id);
        Ok(group)
    }

    pub async fn list_user_groups(client: &SupabaseClient, user_id: &str) -> AppResult<Vec<StudyGroup>> {
        let memberships: Vec<GroupMember> = client
            .select(
                GROUP_MEMBERS_TABLE,
                &Query::new().select("group_id").eq("user_id", user_id),
            )
            .await?;
        let ids: Vec<String> = memberships.into_iter().filter_map(|m| m.group_id).collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        client
            .select(
                STUDY_GROUPS_TABLE,
                &Query::new().in_list("id", ids.as_slice()).order("name", true),
            )
            .await
    }

    pub async fn list_members(client: &SupabaseClient, group_id: &str) -> AppResult<Vec<GroupMember>> {
        client
            .select(
                GROUP_MEMBERS_TABLE,
                &Query::new().eq("group_id", group_id).order("joined_at", true),
            )
            .await
    }

    pub async fn member_role(
        client: &SupabaseClient,
        group_id: &str,
        user_id: &str,
    ) -> AppResult<Option<MemberRole>> {
        let member: Option<GroupMember> = client
            .select_one(
                GROUP_MEMBERS_TABLE,
                &Query::new().eq("group_id", group_id).eq("user_id", user_id),
            )
            .await?;
        Ok(member.map(|m| m.member_role()))
    }

    /// Owners cannot leave their own group.
    pub async fn leave_group(client: &SupabaseClient, group_id: &str, user_id: &str) -> AppResult<()> {
        match Self::member_role(client, group_id, user_id).await? {
            None => Err(AppError::NotFound("You are not a member of this group".to_string())),
            Some(MemberRole::Owner) => Err(AppError::PermissionDenied(
                "The group owner cannot leave the group".to_string(),
            )),
            Some(_) => {
                client
                    .delete(
                        GROUP_MEMBERS_TABLE,
                        &Query::new().eq("group_id", group_id).eq("user_id", user_id),
                    )
                    .await
            }
        }
    }

    /// Issue a time-limited invite. Only owners and admins may do this.
    pub async fn create_invite(
        client: &SupabaseClient,
        group_id: &str,
        created_by: &str,
    ) -> AppResult<Invite> {
        match Self::member_role(client, group_id, created_by).await? {
            Some(role) if role.can_manage() => {}
            _ => {
                return Err(AppError::PermissionDenied(
                    "Only group owners and admins can create invites".to_string(),
                ))
            }
        }

        let invite = Invite {
            group_id: Some(group_id.to_string()),
            code: Some(generate_invite_code()),
            created_by: Some(created_by.to_string()),
            expires_at: Some((Utc::now() + Duration::days(INVITE_EXPIRY_DAYS)).to_rfc3339()),
            ..Default::default()
        };
        client.insert(INVITES_TABLE, &invite).await
    }
}
