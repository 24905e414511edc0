pub mod baas;
pub mod completion_llm;
pub mod supabase;

pub use baas::BaasHandle;
pub use completion_llm::OpenAiCompletionAdapter;
pub use supabase::SupabaseClient;
