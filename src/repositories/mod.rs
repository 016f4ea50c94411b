mod actor;
mod country;
mod genre;
mod movie;
mod review;
mod user;

pub use actor::ActorRepository;
pub use country::CountryRepository;
pub use genre::GenreRepository;
pub use movie::MovieRepository;
pub use review::ReviewRepository;
pub use user::UserRepository;

pub(crate) fn now_sec() -> i64 {
    jiff::Timestamp::now().as_second()
}
