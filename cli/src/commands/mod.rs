pub mod home;
pub mod lookup;
pub mod status;
pub mod subset;
