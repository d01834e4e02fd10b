pub mod doctor;
pub mod doctor_input;
pub mod role;
pub mod user;

pub use doctor::{Doctor, DoctorFilter, DoctorPatch, DoctorWithUser, NewDoctor, WorkHours, WorkSchedule};
pub use doctor_input::{CreateDoctorInput, DoctorMutationResponse, SearchDoctorsQuery, UpdateDoctorInput};
pub use role::{Capability, Role};
pub use user::{NewUser, User, UserPatch, UserSummary};
