//! Profile fetch capability and personalized-answer derivation.

use async_trait::async_trait;
use serde::Deserialize;

use assent_core::AppResult;

/// Profile fields returned by the identity provider's userinfo endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserProfile {
    /// Full name.
    pub name: Option<String>,
    /// Email address.
    pub email: Option<String>,
    /// Preferred nickname.
    pub nickname: Option<String>,
    /// Avatar URL.
    pub picture: Option<String>,
    /// Whether the provider verified the email.
    #[serde(default)]
    pub email_verified: bool,
}

/// Port for fetching a subject's profile with a caller-supplied credential.
///
/// Only exercised on the approved poll path. The fetch is side-effect-free,
/// so repeated polls may re-fetch freely.
#[async_trait]
pub trait ProfileFetcher: Send + Sync {
    /// Fetches the profile the access token grants.
    async fn fetch(&self, access_token: &str) -> AppResult<UserProfile>;
}

/// Derives the answer text for an approved request from the triggering
/// question and the fetched profile. Always non-empty.
#[must_use]
pub fn compose_profile_answer(question: &str, profile: &UserProfile) -> String {
    let lowered = question.to_lowercase();

    if lowered.contains("my name") || lowered.contains("who am i") {
        let name = profile.name.as_deref().unwrap_or("not set in your profile");
        let email = profile.email.as_deref().unwrap_or("not available");
        return format!("Your name is {name}. Your email is {email}.");
    }

    if lowered.contains("my email") {
        let email = profile.email.as_deref().unwrap_or("not available");
        return format!("Your email address is {email}.");
    }

    if lowered.contains("about me") || lowered.contains("my profile") {
        let mut facts = Vec::new();
        if let Some(name) = profile.name.as_deref() {
            facts.push(format!("Name: {name}"));
        }
        if let Some(email) = profile.email.as_deref() {
            facts.push(format!("Email: {email}"));
        }
        if let Some(nickname) = profile.nickname.as_deref() {
            facts.push(format!("Nickname: {nickname}"));
        }
        if profile.picture.is_some() {
            facts.push("You have a profile picture set".to_owned());
        }
        if profile.email_verified {
            facts.push("Your email is verified".to_owned());
        }

        return if facts.is_empty() {
            "I don't have much information about your profile.".to_owned()
        } else {
            format!("Here's what I know about you:\n{}", facts.join("\n"))
        };
    }

    let name = profile.name.as_deref().unwrap_or("a user");
    let email = profile.email.as_deref().unwrap_or("no email");
    format!("Based on your profile: You are {name} ({email}). How can I help you further?")
}
