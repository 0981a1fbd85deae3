//! Polls attached to messages.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::base::{update_field, update_field_opt, update_nullable};
use super::{
    flatten, ChannelId, Context, Emoji, Entity, Message, MessageData, MessageId, User, UserData,
    UserId,
};
use crate::rest::{self, routes, RestRequest};
use crate::serial::nullable;
use crate::Result;

/// The text and emoji of a poll question or answer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PollMedia {
    /// The text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// The emoji of an answer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<Emoji>,
}

/// The raw payload of one poll answer.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PollAnswerData {
    /// The ID of the answer, unique within its poll.
    pub answer_id: u32,
    /// What the answer says.
    #[serde(default)]
    pub poll_media: Option<PollMedia>,
    /// The number of votes, from the poll results.
    #[serde(default)]
    pub count: Option<u64>,
    /// The channel of the poll's message. Filled in by the receiver.
    #[serde(skip)]
    pub channel_id: ChannelId,
    /// The poll's message. Filled in by the receiver.
    #[serde(skip)]
    pub message_id: MessageId,
}

/// The vote count of one answer in the poll results.
#[derive(Debug, Clone, Deserialize)]
pub struct AnswerCount {
    /// The ID of the answer.
    pub id: u32,
    /// The number of votes.
    pub count: u64,
    /// Whether the current user voted for the answer.
    #[serde(default)]
    pub me_voted: bool,
}

/// The results of a poll.
#[derive(Debug, Clone, Deserialize)]
pub struct PollResults {
    /// Whether the votes have been precisely counted.
    #[serde(default)]
    pub is_finalized: bool,
    /// The counts per answer. Answers nobody voted for are left out.
    #[serde(default)]
    pub answer_counts: Vec<AnswerCount>,
}

/// The raw payload of a poll.
///
/// https://discord.com/developers/docs/resources/poll#poll-object
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PollData {
    /// The question of the poll.
    #[serde(default)]
    pub question: Option<PollMedia>,
    /// The answers of the poll.
    #[serde(default)]
    pub answers: Option<Vec<PollAnswerData>>,
    /// When the poll ends.
    #[serde(default, deserialize_with = "nullable")]
    pub expiry: Option<Option<DateTime<Utc>>>,
    /// Whether a user can select more than one answer.
    #[serde(default)]
    pub allow_multiselect: Option<bool>,
    /// The layout of the poll.
    #[serde(default)]
    pub layout_type: Option<u8>,
    /// The vote counts.
    #[serde(default)]
    pub results: Option<PollResults>,
    /// The channel of the poll's message. Filled in by the receiver.
    #[serde(skip)]
    pub channel_id: ChannelId,
    /// The poll's message. Filled in by the receiver.
    #[serde(skip)]
    pub message_id: MessageId,
}

/// An answer of a poll.
#[derive(Debug, Clone, Serialize)]
pub struct PollAnswer {
    #[serde(skip)]
    ctx: Context,
    /// The ID of the answer.
    pub id: u32,
    /// The channel of the poll's message.
    pub channel_id: ChannelId,
    /// The poll's message.
    pub message_id: MessageId,
    /// The text of the answer.
    pub text: Option<String>,
    /// The emoji of the answer.
    pub emoji: Option<Emoji>,
    /// The number of votes, if the results have been received.
    pub count: Option<u64>,
    /// Whether the current user voted for this answer.
    pub me_voted: bool,
    /// The users known to have voted for this answer.
    pub voters: BTreeMap<UserId, User>,
}

impl Entity for PollAnswer {
    type Data = PollAnswerData;

    fn from_data(ctx: &Context, data: &PollAnswerData) -> Self {
        let mut answer = PollAnswer {
            ctx: ctx.clone(),
            id: data.answer_id,
            channel_id: data.channel_id,
            message_id: data.message_id,
            text: None,
            emoji: None,
            count: None,
            me_voted: false,
            voters: BTreeMap::new(),
        };
        answer.patch(data);
        answer
    }

    fn patch(&mut self, data: &PollAnswerData) {
        if let Some(ref media) = data.poll_media {
            update_field_opt(&mut self.text, &media.text);
            update_field_opt(&mut self.emoji, &media.emoji);
        }
        update_field_opt(&mut self.count, &data.count);
    }

    fn to_json(&self) -> Value {
        flatten(self, [("vote_count", json!(self.vote_count()))])
    }
}

impl PollAnswer {
    /// The number of votes for this answer.
    ///
    /// Falls back to the number of known voters until the poll results
    /// arrived.
    pub fn vote_count(&self) -> u64 {
        self.count.unwrap_or(self.voters.len() as u64)
    }

    fn patch_count(&mut self, count: &AnswerCount) {
        self.count = Some(count.count);
        self.me_voted = count.me_voted;
    }

    /// Fetch the users that voted for this answer, adding them to `voters`.
    ///
    /// At most `limit` users (1-100) are fetched, starting after the user
    /// `after` when given.
    pub async fn fetch_voters(
        &mut self,
        limit: Option<u8>,
        after: Option<UserId>,
    ) -> Result<Vec<User>> {
        #[derive(Deserialize)]
        struct Voters {
            users: Vec<UserData>,
        }

        let mut request = RestRequest::get(routes::poll_answer_voters(
            self.channel_id,
            self.message_id,
            self.id,
        ));
        if let Some(limit) = limit {
            request = request.query("limit", limit);
        }
        if let Some(after) = after {
            request = request.query("after", after);
        }

        let voters: Voters = rest::fetch(self.ctx.rest(), request).await?;
        let users: Vec<User> = voters.users.iter().map(User::new).collect();
        for user in &users {
            self.voters.insert(user.id, user.clone());
        }
        Ok(users)
    }
}

/// A poll on a message.
#[derive(Debug, Clone, Serialize)]
pub struct Poll {
    #[serde(skip)]
    ctx: Context,
    /// The channel of the poll's message.
    pub channel_id: ChannelId,
    /// The poll's message.
    pub message_id: MessageId,
    /// The question of the poll.
    pub question: PollMedia,
    /// The answers, by answer ID.
    pub answers: BTreeMap<u32, PollAnswer>,
    /// When the poll ends. `None` for polls that never end.
    pub expires_at: Option<DateTime<Utc>>,
    /// Whether a user can select more than one answer.
    pub allow_multiselect: Option<bool>,
    /// The layout of the poll.
    pub layout_type: u8,
    /// Whether the votes have been precisely counted.
    pub results_finalized: bool,
}

impl Entity for Poll {
    type Data = PollData;

    fn from_data(ctx: &Context, data: &PollData) -> Self {
        let mut poll = Poll {
            ctx: ctx.clone(),
            channel_id: data.channel_id,
            message_id: data.message_id,
            question: PollMedia::default(),
            answers: BTreeMap::new(),
            expires_at: None,
            allow_multiselect: None,
            layout_type: 1,
            results_finalized: false,
        };
        poll.patch(data);
        poll
    }

    fn patch(&mut self, data: &PollData) {
        update_field(&mut self.question, &data.question);
        update_nullable(&mut self.expires_at, &data.expiry);
        update_field_opt(&mut self.allow_multiselect, &data.allow_multiselect);
        update_field(&mut self.layout_type, &data.layout_type);

        if let Some(ref answers) = data.answers {
            for answer in answers {
                let mut answer = answer.clone();
                answer.channel_id = self.channel_id;
                answer.message_id = self.message_id;
                match self.answers.get_mut(&answer.answer_id) {
                    Some(existing) => existing.patch(&answer),
                    None => {
                        let new = PollAnswer::from_data(&self.ctx, &answer);
                        self.answers.insert(new.id, new);
                    }
                }
            }
        }

        if let Some(ref results) = data.results {
            self.results_finalized = results.is_finalized;
            for answer in self.answers.values_mut() {
                match results.answer_counts.iter().find(|count| count.id == answer.id) {
                    Some(count) => answer.patch_count(count),
                    // left out of the results means nobody voted
                    None => answer.patch_count(&AnswerCount {
                        id: answer.id,
                        count: 0,
                        me_voted: false,
                    }),
                }
            }
        }
    }
}

impl Poll {
    /// Whether only part of the poll is known, as in a message update that
    /// carried nothing but the results.
    pub fn partial(&self) -> bool {
        self.allow_multiselect.is_none()
    }

    /// Look up an answer by its ID.
    pub fn answer(&self, id: u32) -> Option<&PollAnswer> {
        self.answers.get(&id)
    }

    /// End the poll early. Only the author of the poll can do this.
    pub async fn end(&self) -> Result<Message> {
        let request = RestRequest::post(routes::poll_expire(self.channel_id, self.message_id));
        let data: MessageData = rest::fetch(self.ctx.rest(), request).await?;
        Ok(Message::from_data(&self.ctx, &data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, Rest};
    use futures::future::BoxFuture;

    #[derive(Debug)]
    struct Offline;

    impl Rest for Offline {
        fn request(&self, _: RestRequest) -> BoxFuture<'_, Result<Option<Value>>> {
            Box::pin(async { Err(Error::Other("offline")) })
        }
    }

    #[test]
    fn answer_without_count_uses_voters() {
        let data: PollAnswerData =
            serde_json::from_value(json!({ "answer_id": 1, "poll_media": { "text": "Yes" } })).unwrap();
        let answer = PollAnswer::from_data(&Context::new(Offline), &data);

        assert_eq!(answer.text.as_deref(), Some("Yes"));
        assert_eq!(answer.count, None);
        assert_eq!(answer.vote_count(), 0);
        assert_eq!(answer.to_json()["vote_count"], json!(0));
    }

    #[test]
    fn results_are_patched_in() {
        let mut data: PollData = serde_json::from_value(json!({
            "question": { "text": "Cats or dogs?" },
            "answers": [
                { "answer_id": 1, "poll_media": { "text": "Cats", "emoji": { "name": "🐈" } } },
                { "answer_id": 2, "poll_media": { "text": "Dogs" } },
            ],
            "expiry": "2024-05-01T00:00:00+00:00",
            "allow_multiselect": false,
            "layout_type": 1,
        }))
        .unwrap();
        data.channel_id = ChannelId(10);
        data.message_id = MessageId(20);
        let mut poll = Poll::from_data(&Context::new(Offline), &data);

        assert!(!poll.partial());
        assert_eq!(poll.question.text.as_deref(), Some("Cats or dogs?"));
        assert_eq!(poll.answer(1).and_then(|a| a.emoji.clone()).and_then(|e| e.name).as_deref(), Some("🐈"));
        assert_eq!(poll.answer(2).map(|a| a.message_id), Some(MessageId(20)));

        let results: PollData = serde_json::from_value(json!({
            "results": {
                "is_finalized": true,
                "answer_counts": [{ "id": 1, "count": 7, "me_voted": true }],
            },
        }))
        .unwrap();
        poll.patch(&results);

        assert!(poll.results_finalized);
        assert_eq!(poll.answer(1).map(PollAnswer::vote_count), Some(7));
        assert_eq!(poll.answer(1).map(|a| a.me_voted), Some(true));
        assert_eq!(poll.answer(2).map(PollAnswer::vote_count), Some(0));
        assert_eq!(poll.question.text.as_deref(), Some("Cats or dogs?"));
    }
}
