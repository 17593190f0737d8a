//! Plain-text email rendering for notification events.

use serde::de::DeserializeOwned;

use crate::bus::{event_types, DomainEvent};
use crate::delivery::OutgoingEmail;
use crate::notices::{
    ApplicationReceived, CompletionNotice, InvitationNotice, OfferNotice, RejectionNotice,
};

fn notice<T: DeserializeOwned>(event: &DomainEvent) -> Option<T> {
    match serde_json::from_value(event.payload.clone()) {
        Ok(n) => Some(n),
        Err(e) => {
            tracing::warn!(
                event_type = %event.event_type,
                error = %e,
                "Notification payload did not match its template"
            );
            None
        }
    }
}

fn pay_label(frequency: &str) -> &'static str {
    match frequency {
        "hourly" => "per hour",
        _ => "per year",
    }
}

/// Render the email for `event`, or `None` for events that send nothing.
pub fn render(event: &DomainEvent) -> Option<OutgoingEmail> {
    match event.event_type.as_str() {
        event_types::APPLICATION_SUBMITTED => {
            let n: ApplicationReceived = notice(event)?;
            Some(OutgoingEmail {
                to: n.applicant_email,
                subject: format!("We received your application - {}", n.property_name),
                body: format!(
                    "Hi {},\n\n\
                     Thank you for applying for the {} position at {}. \
                     Our team will review your application and contact you soon.\n\n\
                     {} Hiring Team",
                    n.applicant_name, n.position, n.property_name, n.property_name
                ),
            })
        }
        event_types::APPLICATION_APPROVED => {
            let n: OfferNotice = notice(event)?;
            Some(OutgoingEmail {
                to: n.employee_email,
                subject: format!("Your job offer from {}", n.property_name),
                body: format!(
                    "Hi {},\n\n\
                     Congratulations! {} is pleased to offer you the position of {}.\n\n\
                     Start date: {}\n\
                     Pay: ${:.2} {}\n\
                     Supervisor: {}\n\n\
                     Please complete your onboarding paperwork before your first day:\n\
                     {}\n\n\
                     This link expires on {}.\n",
                    n.employee_name,
                    n.property_name,
                    n.job_title,
                    n.start_date.format("%B %-d, %Y"),
                    n.pay_rate,
                    pay_label(&n.pay_frequency),
                    n.supervisor,
                    n.onboarding_url,
                    n.expires_at.format("%B %-d, %Y at %H:%M UTC"),
                ),
            })
        }
        event_types::APPLICATION_REJECTED | event_types::APPLICATION_TALENT_POOL => {
            let n: RejectionNotice = notice(event)?;
            let closing = if n.talent_pool {
                "We were impressed by your background and have added you to our talent \
                 pool. We will reach out if a suitable position opens."
            } else {
                "We encourage you to apply for future openings."
            };
            Some(OutgoingEmail {
                to: n.applicant_email,
                subject: format!("Your application to {}", n.property_name),
                body: format!(
                    "Hi {},\n\n\
                     Thank you for your interest in the {} position at {}. \
                     After careful consideration we have decided not to move forward \
                     at this time.\n\n{}\n\n{} Hiring Team",
                    n.applicant_name, n.position, n.property_name, closing, n.property_name
                ),
            })
        }
        event_types::ONBOARDING_INVITATION => {
            let n: InvitationNotice = notice(event)?;
            let greeting = n.recipient_name.as_deref().unwrap_or("there");
            Some(OutgoingEmail {
                to: n.recipient_email,
                subject: format!("Action needed: {} - {}", n.step_title, n.property_name),
                body: format!(
                    "Hi {},\n\n\
                     {} has asked you to complete the following form: {}.\n\n\
                     {}\n\n\
                     This link expires on {}.\n",
                    greeting,
                    n.property_name,
                    n.step_title,
                    n.form_url,
                    n.expires_at.format("%B %-d, %Y"),
                ),
            })
        }
        event_types::ONBOARDING_COMPLETED => {
            let n: CompletionNotice = notice(event)?;
            let to = n.manager_email?;
            let start = n
                .start_date
                .map(|d| format!(" Their start date is {}.", d.format("%B %-d, %Y")))
                .unwrap_or_default();
            Some(OutgoingEmail {
                to,
                subject: format!("Onboarding complete: {}", n.employee_name),
                body: format!(
                    "{} ({}) has completed their onboarding paperwork at {}.{}\n\n\
                     Remember to complete I-9 Section 2 within three business days of \
                     the start date.\n",
                    n.employee_name, n.job_title, n.property_name, start
                ),
            })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};

    use super::*;

    fn offer() -> OfferNotice {
        OfferNotice {
            employee_email: "maria@example.com".into(),
            employee_name: "Maria Lopez".into(),
            property_name: "Harbor Inn".into(),
            job_title: "Room Attendant".into(),
            start_date: NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(),
            pay_rate: 18.5,
            pay_frequency: "hourly".into(),
            supervisor: "Dana Reyes".into(),
            onboarding_url: "https://hr.example.com/onboarding/welcome/abc".into(),
            expires_at: Utc.with_ymd_and_hms(2026, 10, 18, 9, 0, 0).unwrap(),
        }
    }

    #[test]
    fn offer_email_contains_link_and_terms() {
        let event = DomainEvent::new(event_types::APPLICATION_APPROVED).with_notice(&offer());
        let email = render(&event).expect("offer renders");
        assert_eq!(email.to, "maria@example.com");
        assert_eq!(email.subject, "Your job offer from Harbor Inn");
        assert!(email.body.contains("https://hr.example.com/onboarding/welcome/abc"));
        assert!(email.body.contains("$18.50 per hour"));
        assert!(email.body.contains("October 16, 2026"));
    }

    #[test]
    fn talent_pool_email_mentions_pool() {
        let notice = RejectionNotice {
            applicant_email: "sam@example.com".into(),
            applicant_name: "Sam".into(),
            property_name: "Harbor Inn".into(),
            position: "Night Auditor".into(),
            talent_pool: true,
        };
        let event = DomainEvent::new(event_types::APPLICATION_TALENT_POOL).with_notice(&notice);
        let email = render(&event).unwrap();
        assert!(email.body.contains("talent pool"));
    }

    #[test]
    fn completion_without_manager_sends_nothing() {
        let notice = CompletionNotice {
            manager_email: None,
            employee_name: "Maria Lopez".into(),
            property_name: "Harbor Inn".into(),
            job_title: "Room Attendant".into(),
            start_date: None,
        };
        let event = DomainEvent::new(event_types::ONBOARDING_COMPLETED).with_notice(&notice);
        assert!(render(&event).is_none());
    }

    #[test]
    fn malformed_payload_is_skipped() {
        let event = DomainEvent::new(event_types::APPLICATION_APPROVED)
            .with_payload(serde_json::json!({ "unexpected": true }));
        assert!(render(&event).is_none());
    }

    #[test]
    fn unknown_event_renders_nothing() {
        assert!(render(&DomainEvent::new("something.else")).is_none());
    }
}
