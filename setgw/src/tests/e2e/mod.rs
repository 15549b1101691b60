// Helper macro to bootstrap an e2e server in tests. Defined here so child test
// modules can use it directly. It expands to a `let` binding that awaits
// `crate::tests::e2e::util::spawn_test_server()` and yields `(server_handle, client)`.
macro_rules! with_e2e_server {
    ($handle:ident, $client:ident) => {
        let ($handle, mut $client) = crate::tests::e2e::util::spawn_test_server().await;
    };
}

mod connection;
mod set;
mod util;
