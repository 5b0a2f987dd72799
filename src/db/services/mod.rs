pub mod alert_event_service;
pub mod check_result_service;
pub mod subscriber_service;
