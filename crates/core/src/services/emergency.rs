use crate::constants::{
    DOCTOR_EMERGENCY, DOCTOR_EMERGENCY_MESSAGES, DOCTOR_EMERGENCY_SEARCH, DOCTOR_EMERGENCY_SEND,
    STUDENT_EMERGENCY, STUDENT_EMERGENCY_SEND,
};
use crate::models::{
    ChatMessage, MessageList, MessageOverview, OutgoingMessage, OverviewList, StatusMessage,
    StudentThread,
};
use crate::{ApiClient, PortalError, PortalResult};
use chrono::Utc;
use unicare_messaging::Inbox;
use unicare_types::Role;

pub const EMPTY_MESSAGE: &str = "Please enter a message to send.";
pub const NO_STUDENT_SELECTED: &str = "Please select a student before send a message.";

/// A message the API accepted, ready to append to the open thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub ack: StatusMessage,
    pub message: ChatMessage,
}

/// Emergency chat between students and the medical centre.
pub struct EmergencyService<'a> {
    api: &'a ApiClient,
}

impl<'a> EmergencyService<'a> {
    pub fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    /// The student's thread and the doctor on duty.
    pub async fn student_thread(&self) -> PortalResult<StudentThread> {
        self.api.get(STUDENT_EMERGENCY, &[]).await
    }

    pub async fn send_to_centre(&self, text: &str) -> PortalResult<SentMessage> {
        let text = non_empty(text)?;
        let ack: StatusMessage = self
            .api
            .post(STUDENT_EMERGENCY_SEND, &OutgoingMessage { student_id: None, text })
            .await?;
        Ok(sent(ack, text, Role::Student))
    }

    pub async fn overviews(&self) -> PortalResult<Vec<MessageOverview>> {
        let list: OverviewList = self.api.get(DOCTOR_EMERGENCY, &[]).await?;
        Ok(list.overviews)
    }

    /// Replaces the inbox contents with the server's overviews.
    ///
    /// Already-applied push events stay recorded, so a late duplicate is still ignored.
    pub async fn refresh_inbox(&self, inbox: &mut Inbox) -> PortalResult<usize> {
        let overviews = self.overviews().await?;
        let count = overviews.len();
        inbox.replace_overviews(overviews);
        tracing::debug!(count, "inbox refreshed");
        Ok(count)
    }

    pub async fn messages(&self, student_id: &str) -> PortalResult<Vec<ChatMessage>> {
        let list: MessageList = self
            .api
            .get(DOCTOR_EMERGENCY_MESSAGES, &[("studentId", student_id)])
            .await?;
        Ok(list.messages)
    }

    pub async fn search(&self, keyword: &str) -> PortalResult<Vec<MessageOverview>> {
        let list: OverviewList = self
            .api
            .get(DOCTOR_EMERGENCY_SEARCH, &[("keyWord", keyword)])
            .await?;
        Ok(list.overviews)
    }

    pub async fn send_to_student(&self, student_id: &str, text: &str) -> PortalResult<SentMessage> {
        let text = non_empty(text)?;
        if student_id.trim().is_empty() {
            return Err(PortalError::InvalidInput(NO_STUDENT_SELECTED.into()));
        }
        let body = OutgoingMessage {
            student_id: Some(student_id),
            text,
        };
        let ack: StatusMessage = self.api.post(DOCTOR_EMERGENCY_SEND, &body).await?;
        Ok(sent(ack, text, Role::MedicalCentre))
    }
}

fn non_empty(text: &str) -> PortalResult<&str> {
    if text.trim().is_empty() {
        Err(PortalError::InvalidInput(EMPTY_MESSAGE.into()))
    } else {
        Ok(text)
    }
}

fn sent(ack: StatusMessage, text: &str, from: Role) -> SentMessage {
    SentMessage {
        ack,
        message: ChatMessage {
            text: text.to_string(),
            from,
            to: from.counterpart(),
            created_at: Utc::now(),
        },
    }
}
