use chrono::{DateTime, Duration, Utc};
use deadliner_domain::{Deadline, NotificationTier, User};
use deadliner_infra::EmailMessage;
use std::fmt::Write;

const SIGNATURE: &str = "Best regards,\nThe Deadliner Team";
const FOOTER: &str = "You're receiving this because you have deadline notifications enabled.";

fn format_due(due_at: DateTime<Utc>) -> String {
    due_at.format("%B %d, %Y at %I:%M %p UTC").to_string()
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("{} {}", count, unit)
    } else {
        format!("{} {}s", count, unit)
    }
}

fn course_suffix(deadline: &Deadline) -> String {
    match &deadline.course {
        Some(course) if !course.trim().is_empty() => format!(" for {}", course),
        _ => String::new(),
    }
}

/// Whole days, whole hours below a day
fn time_remaining(remaining: Duration) -> String {
    if remaining < Duration::hours(1) {
        "Less than an hour".into()
    } else if remaining < Duration::days(1) {
        plural(remaining.num_hours(), "hour")
    } else {
        plural(remaining.num_days(), "day")
    }
}

fn urgency_color(tier: NotificationTier) -> &'static str {
    match tier {
        NotificationTier::ThreeDays => "#ff8800",
        _ => "#ff4444",
    }
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

pub fn approaching_email(
    user: &User,
    deadline: &Deadline,
    tier: NotificationTier,
    now: DateTime<Utc>,
) -> EmailMessage {
    let due = format_due(deadline.due_at);
    let remaining = time_remaining(deadline.due_at - now);

    let text_body = format!(
        "Hi {name},\n\n\
         This is a friendly reminder that your deadline{course} is approaching:\n\n\
         Deadline: {title}\n\
         Due Date: {due}\n\
         Time Remaining: {remaining}\n\n\
         Don't forget to complete your task on time!\n\n\
         {signature}\n\n---\n{footer}",
        name = user.display_name(),
        course = course_suffix(deadline),
        title = deadline.title,
        due = due,
        remaining = remaining,
        signature = SIGNATURE,
        footer = FOOTER,
    );

    let html_body = format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="UTF-8"><title>Deadline Reminder</title></head>
<body style="font-family: sans-serif; background-color: #f5f5f5; padding: 20px;">
  <div style="max-width: 600px; margin: 0 auto; background-color: white; border-radius: 10px; padding: 30px;">
    <h2>Hi {name}!</h2>
    <p>This is a friendly reminder that your deadline{course} is approaching:</p>
    <div style="border-left: 4px solid {color}; padding: 20px; margin: 20px 0; background-color: #f8f9ff;">
      <h3>{title}</h3>
      <p><strong>Due Date:</strong> {due}</p>
      <p><strong>Time Remaining:</strong> <span style="color: {color}; font-weight: bold;">{remaining}</span></p>
    </div>
    <p>Don't forget to complete your task on time!</p>
    <p style="color: #6c757d; font-size: 12px;">{footer}</p>
  </div>
</body>
</html>"#,
        name = escape_html(user.display_name()),
        course = escape_html(&course_suffix(deadline)),
        color = urgency_color(tier),
        title = escape_html(&deadline.title),
        due = due,
        remaining = remaining,
        footer = FOOTER,
    );

    EmailMessage {
        to: user.email.clone(),
        subject: format!("Deadline Reminder: {}", deadline.title),
        text_body,
        html_body: Some(html_body),
    }
}

pub fn overdue_email(user: &User, deadline: &Deadline, now: DateTime<Utc>) -> EmailMessage {
    let text_body = format!(
        "Hi {name},\n\n\
         Your deadline{course} is now overdue:\n\n\
         Deadline: {title}\n\
         Was Due: {due}\n\
         Overdue by: {overdue}\n\n\
         Please complete this task as soon as possible!\n\n\
         {signature}\n\n---\n{footer}",
        name = user.display_name(),
        course = course_suffix(deadline),
        title = deadline.title,
        due = format_due(deadline.due_at),
        overdue = plural(deadline.days_overdue(now), "day"),
        signature = SIGNATURE,
        footer = FOOTER,
    );

    EmailMessage {
        to: user.email.clone(),
        subject: format!("Overdue: {}", deadline.title),
        text_body,
        html_body: None,
    }
}

pub fn daily_digest_email(
    user: &User,
    upcoming: &[Deadline],
    overdue: &[Deadline],
    now: DateTime<Utc>,
) -> EmailMessage {
    let mut text_body = format!(
        "Hi {},\n\nHere's your daily deadline digest:\n\n",
        user.display_name()
    );

    if !upcoming.is_empty() {
        text_body.push_str("UPCOMING DEADLINES:\n");
        for deadline in upcoming {
            let _ = writeln!(
                text_body,
                "- {} - Due in {}",
                deadline.title,
                time_remaining(deadline.due_at - now).to_lowercase()
            );
        }
        text_body.push('\n');
    }

    if !overdue.is_empty() {
        text_body.push_str("OVERDUE DEADLINES:\n");
        for deadline in overdue {
            let _ = writeln!(
                text_body,
                "- {} - {} overdue",
                deadline.title,
                plural(deadline.days_overdue(now), "day")
            );
        }
        text_body.push('\n');
    }

    text_body.push_str("Stay organized and keep up the great work!\n\nThe Deadliner Team");

    EmailMessage {
        to: user.email.clone(),
        subject: format!("Daily Deadline Digest - {}", now.format("%B %d, %Y")),
        text_body,
        html_body: None,
    }
}
