// Crate entry point. Re-export modules so tests and binaries can import them easily.
//
// Responsibilities
// - Only declare and expose modules. No business logic here.

pub mod core {
    pub mod business_date;
    pub mod pay_config;
    pub mod payroll;
    pub mod ports;
    pub mod work_day;
}

pub mod application {
    pub mod errors;
    pub mod offline_cache;
    pub mod reconciler;
    pub mod service;
}

pub mod adapters {
    pub mod in_memory {
        pub mod clock;
        pub mod fixed_holiday_calendar;
        pub mod in_memory_pay_configs;
        pub mod in_memory_work_day_store;
    }
}

pub mod shell;
