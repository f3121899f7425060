pub mod seaorm;

pub use seaorm::SeaOrmBlogRepository;
