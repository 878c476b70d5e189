pub mod send_due_reminders;
