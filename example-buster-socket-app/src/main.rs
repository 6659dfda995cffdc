use buster_socket_caller::{SocketCallTyped, SocketCallerInterface, SocketEvent, SocketListenTyped};
use buster_socket_tokio_client::{SocketClient, SocketClientConfig};
use example_buster_socket_app::MockBackend;
use example_buster_socket_routes::data_sources::GetDataSourceRequest;
use example_buster_socket_routes::search::SearchRequest;
use example_buster_socket_routes::threads::ListThreadsRequest;
use example_buster_socket_routes::{GetDataSource, ListThreads, Search, ThreadFetchingData};
use tokio::join;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Bind to a random available port
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let _backend_task = tokio::spawn(async move {
        let _ = MockBackend.serve_with_listener(listener).await;
    });

    // `BUSTER_WS_URL` / `BUSTER_WS_BASE_URL` point the demo at a real backend.
    let config = SocketClientConfig::from_env()
        .unwrap_or_else(|| SocketClientConfig::from_base_url(&format!("http://{}", addr)));

    let client = SocketClient::connect(config).await.unwrap();

    client.set_state_change_handler(|state| println!("Socket state: {}", state));
    client.set_error_handler(|error| eprintln!("Notification: {}", error));

    // Server pushes arrive on their own route, independent of any request.
    let progress = ThreadFetchingData::listen(&client, |event| {
        println!(
            "Thread {} message {} is {:?}",
            event.thread_id, event.message_id, event.progress
        );
    });

    let (search, data_source, missing) = join!(
        Search::call(&client, SearchRequest::new("revenue")),
        GetDataSource::call(
            &client,
            GetDataSourceRequest {
                id: "ds-42".to_string(),
            },
        ),
        GetDataSource::call(
            &client,
            GetDataSourceRequest {
                id: "missing".to_string(),
            },
        ),
    );

    println!("Result from search(): {:?}", search);
    println!("Result from get data source: {:?}", data_source);
    println!("Result from get missing data source: {:?}", missing);

    let threads = ListThreads::call(
        &client,
        ListThreadsRequest {
            page: 0,
            page_size: 25,
            admin_view: None,
        },
    )
    .await;
    println!("Result from list threads: {:?}", threads);

    // Let the pushed progress events drain before unsubscribing.
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    client.off(ThreadFetchingData::ROUTE, &progress);

    println!("Performance: {:?}", client.performance_snapshot());
}
