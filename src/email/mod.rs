// ABOUTME: SMTP delivery of workout plans and session recaps to clients
// ABOUTME: Renders branded HTML bodies and sends them via lettre
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SmartGains

//! # Email delivery
//!
//! Trainers email generated plans and session recaps to their clients. Bodies
//! are rendered to HTML here; transport goes through `lettre`'s async SMTP
//! client. With SMTP disabled in config the service logs the message instead
//! of sending, which keeps development and tests offline.

use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{info, warn};

use crate::config::EmailConfig;
use crate::database::progress::WorkoutSession;
use crate::errors::{AppError, AppResult};

/// Sends plan and recap emails to clients
pub struct EmailService {
    config: EmailConfig,
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
}

impl EmailService {
    /// Create an email service from the server's SMTP configuration
    ///
    /// # Errors
    ///
    /// Returns a config error when SMTP is enabled but the relay cannot be
    /// constructed
    pub fn new(config: EmailConfig) -> AppResult<Self> {
        let transport = if config.enabled {
            let mut builder =
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
                    .map_err(|e| AppError::config(format!("Invalid SMTP relay: {e}")))?
                    .port(config.smtp_port);

            if !config.smtp_username.is_empty() {
                builder = builder.credentials(Credentials::new(
                    config.smtp_username.clone(),
                    config.smtp_password.clone(),
                ));
            }
            Some(builder.build())
        } else {
            None
        };

        Ok(Self { config, transport })
    }

    /// Email a workout plan to a client
    ///
    /// # Errors
    ///
    /// Returns `ExternalServiceError` when the relay rejects the message
    pub async fn send_plan(
        &self,
        client_email: &str,
        client_name: &str,
        trainer_name: &str,
        plan_name: &str,
        plan_details: &str,
    ) -> AppResult<()> {
        let subject = format!("Your Workout Plan: {plan_name}");
        let body = build_plan_body(client_name, trainer_name, plan_name, plan_details);
        self.send(client_email, &subject, body).await
    }

    /// Email a session recap to a client
    ///
    /// # Errors
    ///
    /// Returns `ExternalServiceError` when the relay rejects the message
    pub async fn send_session_recap(
        &self,
        client_email: &str,
        client_name: &str,
        trainer_name: &str,
        session: &WorkoutSession,
    ) -> AppResult<()> {
        let subject = format!("Documented Workout Session for {client_name}");
        let body = build_session_recap_body(client_name, trainer_name, session);
        self.send(client_email, &subject, body).await
    }

    async fn send(&self, to: &str, subject: &str, html_body: String) -> AppResult<()> {
        let Some(transport) = &self.transport else {
            info!(%to, %subject, "SMTP disabled, skipping email delivery");
            return Ok(());
        };

        let from: Mailbox = self
            .config
            .from_address
            .parse()
            .map_err(|e| AppError::config(format!("Invalid SMTP from address: {e}")))?;
        let to_mailbox: Mailbox = to
            .parse()
            .map_err(|e| AppError::invalid_input(format!("Invalid recipient address {to:?}: {e}")))?;

        let message = Message::builder()
            .from(from)
            .to(to_mailbox)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body)
            .map_err(|e| AppError::internal(format!("Failed to build email: {e}")))?;

        transport.send(message).await.map_err(|e| {
            warn!(%to, "email delivery failed: {e}");
            AppError::external_service("smtp", format!("Delivery failed: {e}"))
        })?;

        Ok(())
    }
}

/// Shared HTML shell with the SmartGains branding block
fn wrap_branded(content: &str, footer: &str) -> String {
    format!(
        r#"<html>
    <head>
        <style>
            body {{
                font-family: 'Helvetica', 'Arial', sans-serif;
                line-height: 1.6;
                color: #333;
            }}
            .content {{
                margin: 20px;
            }}
            ul, ol {{
                margin-top: 10px;
                padding-left: 20px;
            }}
            li {{
                margin-bottom: 10px;
            }}
            .brand {{
                font-family: Arial, sans-serif;
                font-size: 18px;
                font-weight: bold;
                color: #a8ff04;
                text-shadow: 2px 2px 3px rgba(0, 0, 0, 0.7);
                text-align: center;
                background-color: #00dffc;
                padding: 10px;
                border-radius: 5px;
                box-shadow: 0 0 8px #00dffc;
            }}
        </style>
    </head>
    <body>
        <div class="brand">SmartGains Fitness Plan</div>
        {content}
        <div class="brand">
            {footer}
        </div>
    </body>
</html>"#
    )
}

/// Render the plan-delivery body
fn build_plan_body(
    client_name: &str,
    trainer_name: &str,
    plan_name: &str,
    plan_details: &str,
) -> String {
    let escaped_details = escape_html(plan_details).replace('\n', "<br>");
    let content = format!(
        r#"<p>Hello {client_name},</p>
        <p>{trainer_name} has prepared a new workout plan for you: <strong>{plan_name}</strong>.</p>
        <div class="content">{escaped_details}</div>"#
    );
    let footer = format!("<p>Best regards,</p><p>{trainer_name} at SmartGains</p>");
    wrap_branded(&content, &footer)
}

/// Render the session-recap body
fn build_session_recap_body(
    client_name: &str,
    trainer_name: &str,
    session: &WorkoutSession,
) -> String {
    let exercise_bullets: String = session
        .exercises_log
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| format!("<li>{}</li>", escape_html(line.trim())))
        .collect();

    let notes = session.trainer_notes.as_deref().unwrap_or("None");
    let content = format!(
        r#"<p>Hello {client_name},</p>
        <p>Here is a recap of your workout session with {trainer_name} completed on {date}:</p>
        <div class="content">
            You completed a {workout_type} workout lasting {duration} minutes at {location}.
            The session focused on the following exercises:
            <ul>{exercise_bullets}</ul>
            You worked out at an intensity level of {intensity}, and you rated the session a {rating} out of 10.
            Additional notes from {trainer_name} include: {notes}.
        </div>"#,
        date = session.date,
        workout_type = escape_html(&session.workout_type),
        duration = session.duration_minutes,
        location = escape_html(&session.location),
        intensity = escape_html(&session.intensity_level),
        rating = session.workout_rating,
        notes = escape_html(notes),
    );
    let footer = format!("<p>Best regards,</p><p>{trainer_name} at SmartGains</p>");
    wrap_branded(&content, &footer)
}

/// Minimal HTML escaping for user-entered text embedded in email bodies
fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_session() -> WorkoutSession {
        WorkoutSession {
            id: 1,
            client_id: 2,
            name: Some("Leg Day".to_owned()),
            date: "2025-06-01".to_owned(),
            workout_type: "Strength Training".to_owned(),
            duration_minutes: 60,
            exercises_log: "Squats 3x8\nLunges 3x10\n".to_owned(),
            intensity_level: "moderate".to_owned(),
            location: "Local Gym".to_owned(),
            workout_rating: 8,
            trainer_notes: Some("Great depth on squats".to_owned()),
            workout_source: "AI".to_owned(),
            generated_plan_id: Some(4),
            demo_plan_id: None,
            day_index: Some(1),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            client_first_name: None,
            client_last_name: None,
        }
    }

    #[test]
    fn test_session_recap_body_lists_exercises() {
        let body = build_session_recap_body("Alex", "Jordan Smith", &sample_session());
        assert!(body.contains("<li>Squats 3x8</li>"));
        assert!(body.contains("<li>Lunges 3x10</li>"));
        assert!(body.contains("Strength Training"));
        assert!(body.contains("SmartGains Fitness Plan"));
        assert!(body.contains("Great depth on squats"));
    }

    #[test]
    fn test_plan_body_escapes_markup() {
        let body = build_plan_body("Alex", "Jordan", "Plan", "reps < 10 & sets > 2");
        assert!(body.contains("reps &lt; 10 &amp; sets &gt; 2"));
    }

    #[test]
    fn test_disabled_service_skips_delivery() {
        let service = EmailService::new(EmailConfig {
            enabled: false,
            smtp_host: "localhost".to_owned(),
            smtp_port: 587,
            smtp_username: String::new(),
            smtp_password: String::new(),
            from_address: "SmartGains <no-reply@smartgains.app>".to_owned(),
        })
        .unwrap();
        assert!(service.transport.is_none());
    }
}
