mod clock;
mod models;
