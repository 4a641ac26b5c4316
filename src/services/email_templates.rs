//! HTML and plain-text bodies for the two outgoing messages.

use chrono::{Datelike, Utc};

#[derive(Debug, Clone, PartialEq)]
pub struct EmailContent {
    pub subject: String,
    pub html: String,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub organization: Option<String>,
    pub subject: String,
    pub message: String,
}

pub fn otp_email(otp: &str, app_name: &str, ttl_minutes: i64) -> EmailContent {
    let year = Utc::now().year();
    let app_name = escape_html(app_name);

    let html = format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Password Reset OTP</title>
</head>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333; margin: 0; padding: 20px; background: #f5f5f5;">
    <div style="max-width: 600px; margin: 0 auto; background: white; border-radius: 8px; padding: 30px;">
        <div style="text-align: center; margin-bottom: 30px;">
            <h1>Password Reset Request</h1>
            <p>Use the OTP below to reset your password:</p>
        </div>
        <div style="font-size: 32px; font-weight: bold; color: #2d3748; letter-spacing: 5px; text-align: center; margin: 20px 0; padding: 15px; background: #f8f9fa; border-radius: 5px;">{otp}</div>
        <p style="color: #e53e3e; font-size: 14px; text-align: center;">This OTP will expire in {ttl} minutes.</p>
        <p>If you didn't request this password reset, please ignore this email.</p>
        <div style="margin-top: 30px; padding-top: 20px; border-top: 1px solid #e2e8f0; text-align: center; color: #718096; font-size: 12px;">
            &copy; {year} {app_name}. All rights reserved.
        </div>
    </div>
</body>
</html>"#,
        otp = escape_html(otp),
        ttl = ttl_minutes,
        year = year,
        app_name = app_name,
    );

    let text = format!(
        "Your OTP is: {}\n\nThis OTP will expire in {} minutes.\n\nIf you didn't request a password reset, please ignore this email.",
        otp, ttl_minutes
    );

    EmailContent {
        subject: "Your Password Reset OTP".to_string(),
        html,
        text,
    }
}

pub fn contact_email(submission: &ContactSubmission) -> EmailContent {
    let phone = submission.phone.as_deref().unwrap_or("Not provided");
    let organization = submission.organization.as_deref().unwrap_or("Not provided");

    let html = format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; padding: 20px;">
  <h2>New Contact Form Submission</h2>
  <p><strong>Name:</strong> {name}</p>
  <p><strong>Email:</strong> {email}</p>
  <p><strong>Phone:</strong> {phone}</p>
  <p><strong>Organization:</strong> {organization}</p>
  <p><strong>Subject:</strong> {subject}</p>
  <hr />
  <p style="white-space: pre-line; background: #f5f5f5; padding: 15px; border-radius: 5px;">{message}</p>
</div>"#,
        name = escape_html(&submission.name),
        email = escape_html(&submission.email),
        phone = escape_html(phone),
        organization = escape_html(organization),
        subject = escape_html(&submission.subject),
        message = escape_html(&submission.message).replace('\n', "<br/>"),
    );

    let text = format!(
        "New Contact Form Submission\n\nName: {}\nEmail: {}\nPhone: {}\nOrganization: {}\nSubject: {}\n\nMessage:\n{}\n",
        submission.name, submission.email, phone, organization, submission.subject, submission.message
    );

    EmailContent {
        subject: format!("Contact Form: {}", submission.subject),
        html,
        text,
    }
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
