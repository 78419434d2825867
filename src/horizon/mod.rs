//! Query and submission client
//!
//! [`HorizonClient`] reads ledger state over the query API and submits
//! signed envelopes. All network access goes through a
//! [`HorizonTransport`], so tests drive the client with a recording mock.
//!
//! Collections are paginated with [`PageRequest`] and, where the server
//! supports it, followed live as server-sent events. Collections that
//! cannot be streamed report `supports_streaming() == false` and refuse
//! `stream()` with [`TxAsmError::Unsupported`].

pub mod page;
pub mod resources;
pub mod sse;
pub mod transport;

pub use page::{Order, Page, PageRequest, DEFAULT_PAGE_LIMIT};
pub use resources::*;
pub use sse::EventStream;
pub use transport::{HorizonTransport, HttpTransport, DEFAULT_TIMEOUT_SECS};

use crate::amount::Amount;
use crate::asset::Asset;
use crate::error::{Result, TxAsmError};
use crate::keys::{AccountId, KeyPair};
use crate::network::NetworkConfig;
use crate::submit::TransactionResult;
use crate::transaction::{TransactionBuilder, TransactionEnvelope};
use reqwest::Url;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use tracing::{debug, info, warn};

/// Which parent resource a collection is nested under
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    All,
    Account(AccountId),
    Ledger(u64),
    Transaction(String),
    Operation(String),
}

impl Scope {
    fn prefix(&self) -> String {
        match self {
            Scope::All => String::new(),
            Scope::Account(id) => format!("/accounts/{}", id),
            Scope::Ledger(sequence) => format!("/ledgers/{}", sequence),
            Scope::Transaction(hash) => format!("/transactions/{}", hash),
            Scope::Operation(id) => format!("/operations/{}", id),
        }
    }
}

/// `base` with `params` appended as a form-encoded query
pub(crate) fn encode_query<K, V>(base: &str, params: &[(K, V)]) -> Result<String>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    if params.is_empty() {
        return Ok(base.to_string());
    }
    Url::parse_with_params(base, params)
        .map(String::from)
        .map_err(|e| TxAsmError::Config(format!("invalid url {:?}: {}", base, e)))
}

/// Problem documents with a status in (400, 500] become errors
fn check_problem(value: serde_json::Value) -> Result<serde_json::Value> {
    let status = value.get("status").and_then(serde_json::Value::as_u64);
    match status {
        Some(status) if status > 400 && status <= 500 => Err(TxAsmError::Horizon {
            status: status as u16,
            title: value
                .get("title")
                .and_then(serde_json::Value::as_str)
                .unwrap_or_default()
                .to_string(),
        }),
        _ => Ok(value),
    }
}

/// Blocking client for one network
pub struct HorizonClient<T = HttpTransport> {
    network: NetworkConfig,
    transport: T,
}

impl HorizonClient<HttpTransport> {
    pub fn new(network: NetworkConfig) -> Result<Self> {
        Self::with_timeout(network, DEFAULT_TIMEOUT_SECS)
    }

    pub fn with_timeout(network: NetworkConfig, timeout_secs: u64) -> Result<Self> {
        Ok(Self::with_transport(network, HttpTransport::new(timeout_secs)?))
    }
}

impl<T: HorizonTransport> HorizonClient<T> {
    pub fn with_transport(network: NetworkConfig, transport: T) -> Self {
        Self { network, transport }
    }

    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.network.horizon_url(), path)
    }

    fn query_url(&self, path: &str, params: &[(String, String)]) -> Result<String> {
        encode_query(&self.url(path), params)
    }

    fn get_url<R: DeserializeOwned>(&self, url: &str) -> Result<R> {
        let value = check_problem(self.transport.get_json(url)?)?;
        Ok(serde_json::from_value(value)?)
    }

    fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R> {
        self.get_url(&self.url(path))
    }

    /// Current state of an account; [`TxAsmError::AccountNotFound`] if it
    /// does not exist on this network
    pub fn account(&self, id: &AccountId) -> Result<AccountRecord> {
        self.get(&format!("/accounts/{}", id)).map_err(|e| match e {
            TxAsmError::Horizon { status: 404, .. } => TxAsmError::AccountNotFound(id.to_string()),
            other => other,
        })
    }

    /// Sequence number currently stored for an account
    pub fn sequence(&self, id: &AccountId) -> Result<i64> {
        Ok(self.account(id)?.sequence)
    }

    pub fn transaction(&self, hash: &str) -> Result<TransactionRecord> {
        self.get(&format!("/transactions/{}", hash))
    }

    pub fn ledger(&self, sequence: u64) -> Result<LedgerRecord> {
        self.get(&format!("/ledgers/{}", sequence))
    }

    pub fn operation(&self, id: &str) -> Result<OperationRecord> {
        self.get(&format!("/operations/{}", id))
    }

    /// Open offers trading `selling` for `buying`
    pub fn order_book(&self, selling: &Asset, buying: &Asset) -> Result<OrderBook> {
        let mut params = selling.query_params("selling_");
        params.extend(buying.query_params("buying_"));
        self.get_url(&self.query_url("/order_book", &params)?)
    }

    /// Ways for `from` to deliver `amount` of `asset` to `to`
    pub fn find_payment_paths(
        &self,
        from: &AccountId,
        to: &AccountId,
        asset: &Asset,
        amount: Amount,
    ) -> Result<Vec<PaymentPath>> {
        let mut params = vec![
            ("source_account".to_string(), from.to_string()),
            ("destination_account".to_string(), to.to_string()),
        ];
        params.extend(asset.query_params("destination_"));
        params.push(("destination_amount".to_string(), amount.to_string()));
        let url = self.query_url("/paths", &params)?;
        Ok(Page::from_json(check_problem(self.transport.get_json(&url)?)?)?.records)
    }

    fn collection<R>(&self, path: String, streamable: bool) -> Collection<'_, R, T> {
        self.filtered_collection(path, Vec::new(), streamable)
    }

    fn filtered_collection<R>(
        &self,
        path: String,
        params: Vec<(String, String)>,
        streamable: bool,
    ) -> Collection<'_, R, T> {
        Collection {
            client: self,
            path,
            params,
            streamable,
            _record: PhantomData,
        }
    }

    pub fn transactions(&self, scope: Scope) -> Collection<'_, TransactionRecord, T> {
        self.collection(format!("{}/transactions", scope.prefix()), true)
    }

    pub fn ledgers(&self) -> Collection<'_, LedgerRecord, T> {
        self.collection("/ledgers".to_string(), true)
    }

    pub fn operations(&self, scope: Scope) -> Collection<'_, OperationRecord, T> {
        self.collection(format!("{}/operations", scope.prefix()), true)
    }

    pub fn payments(&self, scope: Scope) -> Collection<'_, PaymentRecord, T> {
        self.collection(format!("{}/payments", scope.prefix()), true)
    }

    pub fn effects(&self, scope: Scope) -> Collection<'_, EffectRecord, T> {
        self.collection(format!("{}/effects", scope.prefix()), true)
    }

    pub fn offers(&self, account: &AccountId) -> Collection<'_, OfferRecord, T> {
        self.collection(format!("/accounts/{}/offers", account), false)
    }

    pub fn trades(&self, base: Option<&Asset>, counter: Option<&Asset>) -> Collection<'_, TradeRecord, T> {
        let mut params = Vec::new();
        if let Some(base) = base {
            params.extend(base.query_params("base_"));
        }
        if let Some(counter) = counter {
            params.extend(counter.query_params("counter_"));
        }
        self.filtered_collection("/trades".to_string(), params, false)
    }

    pub fn assets(&self, code: Option<&str>, issuer: Option<&AccountId>) -> Collection<'_, AssetRecord, T> {
        let mut params = Vec::new();
        if let Some(code) = code {
            params.push(("asset_code".to_string(), code.to_string()));
        }
        if let Some(issuer) = issuer {
            params.push(("asset_issuer".to_string(), issuer.to_string()));
        }
        self.filtered_collection("/assets".to_string(), params, false)
    }

    /// POST a base64 envelope and classify the response
    pub fn post_transaction(&self, envelope_xdr: &str) -> Result<TransactionResult> {
        let url = self.url("/transactions/");
        let response = self.transport.post_form(&url, &[("tx", envelope_xdr)])?;
        let result = TransactionResult::from_json(response)?;
        match &result {
            TransactionResult::Success(submitted) => {
                info!(hash = %submitted.hash, ledger = submitted.ledger, "transaction accepted")
            }
            TransactionResult::Failure(errors) => warn!(
                status = errors.status,
                title = %errors.title,
                code = %errors.transaction,
                operations = ?errors.operations,
                "transaction rejected"
            ),
        }
        Ok(result)
    }

    pub fn submit_envelope(&self, envelope: &TransactionEnvelope) -> Result<TransactionResult> {
        self.post_transaction(&envelope.to_base64()?)
    }

    /// Build, sign and submit. The account sequence is fetched only when
    /// the builder has no explicit one.
    pub fn submit(&self, builder: &TransactionBuilder) -> Result<TransactionResult> {
        if builder.network().network_id() != self.network.network_id() {
            return Err(TxAsmError::InvalidTransaction(format!(
                "transaction is for {:?}, client is on {:?}",
                builder.network().passphrase(),
                self.network.passphrase()
            )));
        }
        let current = if builder.needs_sequence() {
            let sequence = self.sequence(builder.source())?;
            debug!(account = %builder.source(), sequence, "fetched account sequence");
            Some(sequence)
        } else {
            None
        };
        let envelope = builder.build_envelope(current)?;
        self.submit_envelope(&envelope)
    }

    /// Configure a transaction in `configure` and submit it whenever the
    /// closure returns `Ok`, including early returns.
    ///
    /// Submission is not unconditional: if the closure returns `Err`, or
    /// the source cannot be parsed, that error is returned and nothing is
    /// sent. To submit a partially configured transaction anyway, build a
    /// [`TransactionBuilder`] directly and call [`HorizonClient::submit`].
    pub fn transact<F>(&self, source: &str, signers: Vec<KeyPair>, configure: F) -> Result<TransactionResult>
    where
        F: FnOnce(&mut TransactionBuilder) -> Result<()>,
    {
        let mut builder = TransactionBuilder::from_source(source, signers, self.network.clone())?;
        configure(&mut builder)?;
        self.submit(&builder)
    }
}

/// A paginated, optionally streamable list of records
pub struct Collection<'c, R, T> {
    client: &'c HorizonClient<T>,
    path: String,
    /// Filters sent with every page request
    params: Vec<(String, String)>,
    streamable: bool,
    _record: PhantomData<fn() -> R>,
}

impl<'c, R: DeserializeOwned, T: HorizonTransport> Collection<'c, R, T> {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    pub fn supports_streaming(&self) -> bool {
        self.streamable
    }

    /// Absolute URL of the page selected by `request`
    pub fn url(&self, request: &PageRequest) -> Result<String> {
        let mut params = self.params.clone();
        params.extend(request.params());
        self.client.query_url(&self.path, &params)
    }

    pub fn fetch(&self, request: &PageRequest) -> Result<Page<R>> {
        let url = self.url(request)?;
        Page::from_json(check_problem(self.client.transport.get_json(&url)?)?)
    }

    /// Oldest record, if any
    pub fn first(&self) -> Result<Option<R>> {
        let page = self.fetch(&PageRequest::new().limit(1).order(Order::Asc))?;
        Ok(page.records.into_iter().next())
    }

    /// Newest record, if any
    pub fn last(&self) -> Result<Option<R>> {
        let page = self.fetch(&PageRequest::new().limit(1).order(Order::Desc))?;
        Ok(page.records.into_iter().next())
    }

    pub fn next_page(&self, page: &Page<R>) -> Result<Option<Page<R>>> {
        self.follow(page.next_href())
    }

    pub fn prev_page(&self, page: &Page<R>) -> Result<Option<Page<R>>> {
        self.follow(page.prev_href())
    }

    fn follow(&self, href: Option<&str>) -> Result<Option<Page<R>>> {
        match href {
            Some(href) => {
                let value = check_problem(self.client.transport.get_json(href)?)?;
                Page::from_json(value).map(Some)
            }
            None => Ok(None),
        }
    }

    /// Follow new records as they are added to the ledger
    pub fn stream(&self, request: &PageRequest) -> Result<EventStream<R>> {
        if !self.streamable {
            return Err(TxAsmError::Unsupported(format!(
                "{} cannot be streamed",
                self.path
            )));
        }
        let url = self.url(request)?;
        Ok(EventStream::new(self.client.transport.open_stream(&url)?))
    }
}

#[cfg(test)]
mod tests {
    use super::transport::mock::{MockTransport, Request};
    use super::*;
    use serde_json::json;

    const SEED: &str = "SALCB22A3PL2JFI3GE62BM4S2TE64NJZP4GF2DBGPBC6QIUQ7GI7BRBN";
    const SOURCE: &str = "GBWF6NTCPGBROJIPF54XXYRLTUGBDLLORPFDK4FGQQ3IRI4T5PHCGVXV";
    const DEST: &str = "GDZ4R34MNVITLNZ4KVKBEANJU3UZZFZZLOX7ZVU5AWI7FEL5A6JWDM24";
    const ISSUER: &str = "GDUWG5CZ6YJNWOPQB33DOKWVWSNHJAWPWOUNAEBVTM7QRJ66NGFYEFAJ";
    const HORIZON: &str = "https://horizon-testnet.stellar.org";
    const CREATE_ACCOUNT: &str = "AAAAAGxfNmJ5gxclDy95e+IrnQwRrW6LyjVwpoQ2iKOT684jAAAAZABlTtQAAAAZAAAAAAAAAAAAAAABAAAAAQAAAABsXzZieYMXJQ8veXviK50MEa1ui8o1cKaENoijk+vOIwAAAAAAAAAA88jvjG1RNbc8VVQSAamm6ZyXOVuv/NadBZHykX0Hk2EAAAAAO5rKAAAAAAAAAAABk+vOIwAAAEAXazw4qM/rzuDpw4+cLbuHrPhM6Ugq5FSEfRVTwHQ20baNlf2PEW+5acvXn2ntI5U2KXbUxgvUgGGs3U5rgpIO";

    fn account_json(id: &str) -> serde_json::Value {
        json!({
            "id": id,
            "paging_token": "",
            "account_id": id,
            "sequence": "28515645087809560",
            "subentry_count": 1,
            "inflation_destination": "",
            "thresholds": {"low_threshold": 1, "med_threshold": 1, "high_threshold": 1},
            "flags": {"auth_required": true, "auth_revocable": false},
            "balances": [{"balance": "9999.9999900", "asset_type": "native"}],
            "signers": [{"public_key": id, "weight": 42, "key": id, "type": "ed25519_public_key"}],
            "data": {}
        })
    }

    fn account_url(id: &str) -> String {
        format!("{}/accounts/{}", HORIZON, id)
    }

    fn client(transport: MockTransport) -> HorizonClient<MockTransport> {
        HorizonClient::with_transport(NetworkConfig::testnet(), transport)
    }

    fn accepting() -> MockTransport {
        MockTransport::new()
            .with_json(&account_url(SOURCE), account_json(SOURCE))
            .with_post_response(json!({"hash": "cafebabe", "ledger": "42"}))
    }

    fn dest() -> AccountId {
        DEST.parse().unwrap()
    }

    #[test]
    fn test_account_fetch() {
        let client = client(MockTransport::new().with_json(&account_url(DEST), account_json(DEST)));
        let account = client.account(&dest()).unwrap();
        assert_eq!(account.sequence, 28515645087809560);
        assert_eq!(account.signers[0].weight, 42);
        assert_eq!(client.transport.requests(), vec![Request::Get(account_url(DEST))]);
    }

    #[test]
    fn test_missing_account() {
        let client = client(MockTransport::new().with_json(
            &account_url(DEST),
            json!({"status": 404, "title": "Resource Missing"}),
        ));
        assert!(matches!(client.account(&dest()), Err(TxAsmError::AccountNotFound(_))));
    }

    #[test]
    fn test_submit_fetches_sequence_and_posts_envelope() {
        let client = client(accepting());
        let mut builder = TransactionBuilder::from_source(SEED, vec![], NetworkConfig::testnet()).unwrap();
        builder.create_account(dest(), "100".parse().unwrap());

        let result = client.submit(&builder).unwrap();
        assert!(result.is_success());
        assert_eq!(result.result().unwrap().hash, "cafebabe");
        assert_eq!(result.result().unwrap().ledger, 42);

        assert_eq!(
            client.transport.requests(),
            vec![
                Request::Get(account_url(SOURCE)),
                Request::Post(
                    format!("{}/transactions/", HORIZON),
                    vec![("tx".to_string(), CREATE_ACCOUNT.to_string())]
                ),
            ]
        );
    }

    #[test]
    fn test_submit_with_explicit_sequence_skips_lookup() {
        let client = client(accepting());
        let mut builder = TransactionBuilder::from_source(SEED, vec![], NetworkConfig::testnet()).unwrap();
        builder.sequence(28515645087809561).create_account(dest(), "100".parse().unwrap());

        client.submit(&builder).unwrap();
        let requests = client.transport.requests();
        assert_eq!(requests.len(), 1);
        assert!(matches!(&requests[0], Request::Post(_, form) if form[0].1 == CREATE_ACCOUNT));
    }

    #[test]
    fn test_submit_unknown_account() {
        let client = client(
            MockTransport::new()
                .with_json(&account_url(SOURCE), json!({"status": 404, "title": "Resource Missing"})),
        );
        let mut builder = TransactionBuilder::from_source(SEED, vec![], NetworkConfig::testnet()).unwrap();
        builder.run_inflation();
        assert!(matches!(client.submit(&builder), Err(TxAsmError::AccountNotFound(_))));
        assert_eq!(client.transport.requests().len(), 1);
    }

    #[test]
    fn test_submit_rejection_is_a_value() {
        let client = client(
            MockTransport::new()
                .with_json(&account_url(SOURCE), account_json(SOURCE))
                .with_post_response(json!({
                    "status": 400,
                    "title": "Transaction Failed",
                    "extras": {"result_codes": {"transaction": "tx_failed", "operations": ["op_no_destination"]}}
                })),
        );
        let result = client
            .transact(SEED, vec![], |tx| {
                tx.pay(dest(), "1".parse()?, Asset::Native);
                Ok(())
            })
            .unwrap();
        assert!(!result.is_success());
        assert_eq!(result.errors().unwrap().operations, vec!["op_no_destination"]);
    }

    #[test]
    fn test_submit_rejects_foreign_network() {
        let client = client(accepting());
        let mut builder = TransactionBuilder::from_source(SEED, vec![], NetworkConfig::public()).unwrap();
        builder.run_inflation();
        assert!(matches!(client.submit(&builder), Err(TxAsmError::InvalidTransaction(_))));
        assert!(client.transport.requests().is_empty());
    }

    #[test]
    fn test_transact_submits_on_early_return() {
        let client = client(accepting());
        let result = client
            .transact(SEED, vec![], |tx| {
                tx.create_account(dest(), "100".parse()?);
                if tx.needs_sequence() {
                    return Ok(());
                }
                tx.run_inflation();
                Ok(())
            })
            .unwrap();
        assert!(result.is_success());
        assert!(matches!(
            client.transport.requests().last(),
            Some(Request::Post(_, form)) if form[0].1 == CREATE_ACCOUNT
        ));
    }

    #[test]
    fn test_transact_does_not_submit_on_error() {
        let client = client(accepting());
        let outcome = client.transact(SEED, vec![], |tx| {
            tx.create_account(dest(), "100".parse()?);
            tx.put_data("", b"value")?;
            Ok(())
        });
        assert!(matches!(outcome, Err(TxAsmError::InvalidOperation(_))));
        assert!(client.transport.requests().is_empty());
    }

    #[test]
    fn test_scoped_collection_paths() {
        let client = client(MockTransport::new());
        assert_eq!(client.payments(Scope::Account(dest())).path(), format!("/accounts/{}/payments", DEST));
        assert_eq!(client.effects(Scope::Ledger(7)).path(), "/ledgers/7/effects");
        assert_eq!(client.operations(Scope::Transaction("ab".into())).path(), "/transactions/ab/operations");
        assert_eq!(client.effects(Scope::Operation("9".into())).path(), "/operations/9/effects");
        assert_eq!(client.ledgers().path(), "/ledgers");
        let assets = client.assets(Some("USD"), None);
        assert_eq!(assets.path(), "/assets");
        assert_eq!(assets.params(), &[("asset_code".to_string(), "USD".to_string())]);
        assert!(client.assets(None, None).params().is_empty());
        let usd = Asset::credit("USD", ISSUER.parse().unwrap()).unwrap();
        assert_eq!(
            client.trades(Some(&Asset::Native), Some(&usd)).url(&PageRequest::new()).unwrap(),
            format!(
                "{}/trades?base_asset_type=native&counter_asset_type=credit_alphanum4&counter_asset_code=USD&counter_asset_issuer={}&limit=10&order=asc",
                HORIZON, ISSUER
            )
        );
    }

    #[test]
    fn test_query_values_are_encoded() {
        let client = client(MockTransport::new());
        let url = client
            .assets(Some("A&B C"), None)
            .url(&PageRequest::new().cursor("12#3+4"))
            .unwrap();
        assert_eq!(
            url,
            format!("{}/assets?asset_code=A%26B+C&cursor=12%233%2B4&limit=10&order=asc", HORIZON)
        );
        let pairs: Vec<(String, String)> = Url::parse(&url)
            .unwrap()
            .query_pairs()
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();
        assert_eq!(pairs[0], ("asset_code".to_string(), "A&B C".to_string()));
        assert_eq!(pairs[1], ("cursor".to_string(), "12#3+4".to_string()));
    }

    #[test]
    fn test_encode_query_without_params() {
        let empty: [(&str, &str); 0] = [];
        assert_eq!(encode_query("https://x.org/ledgers", &empty).unwrap(), "https://x.org/ledgers");
        assert!(matches!(encode_query("not a url", &[("a", "b")]), Err(TxAsmError::Config(_))));
    }

    #[test]
    fn test_fetch_page_and_follow_links() {
        let first_url = format!("{}/ledgers?limit=2&order=desc", HORIZON);
        let next_url = format!("{}/ledgers?order=desc&limit=2&cursor=1", HORIZON);
        let ledger = |sequence: u64| {
            json!({
                "id": format!("id{}", sequence), "paging_token": sequence.to_string(),
                "hash": "h", "prev_hash": "p", "sequence": sequence,
                "transaction_count": 1, "operation_count": 1,
                "closed_at": "2017-12-05T10:43:05Z",
                "total_coins": "103491574319.4671445", "fee_pool": "1468208.3174628",
                "base_fee": 100, "base_reserve": "10.0000000", "max_tx_set_size": 50
            })
        };
        let transport = MockTransport::new()
            .with_json(
                &first_url,
                json!({
                    "_links": {"next": {"href": next_url}, "prev": {"href": "unused"}},
                    "_embedded": {"records": [ledger(3), ledger(2)]}
                }),
            )
            .with_json(
                &next_url,
                json!({"_links": {}, "_embedded": {"records": [ledger(1)]}}),
            );
        let client = client(transport);
        let ledgers = client.ledgers();

        let page = ledgers.fetch(&PageRequest::new().limit(2).order(Order::Desc)).unwrap();
        assert_eq!(page.records.iter().map(|l| l.sequence).collect::<Vec<_>>(), vec![3, 2]);

        let next = ledgers.next_page(&page).unwrap().unwrap();
        assert_eq!(next.records[0].sequence, 1);
        assert!(ledgers.next_page(&next).unwrap().is_none());
    }

    #[test]
    fn test_first_on_empty_collection() {
        let url = format!("{}/accounts/{}/offers?limit=1&order=asc", HORIZON, DEST);
        let client = client(MockTransport::new().with_json(&url, json!({"_embedded": {"records": []}})));
        assert!(client.offers(&dest()).first().unwrap().is_none());
    }

    #[test]
    fn test_stream_capability() {
        let url = format!("{}/accounts/{}/payments?cursor=now&limit=10&order=asc", HORIZON, DEST);
        let event = json!({
            "id": "2", "paging_token": "2", "source_account": ISSUER,
            "type": "payment", "type_i": 1,
            "created_at": "2018-01-13T06:28:58Z", "transaction_hash": "bb",
            "asset_type": "native", "from": ISSUER, "to": DEST, "amount": "5.0000000"
        });
        let body = format!("data: \"hello\"\n\ndata: {}\n\n", event);
        let client = client(MockTransport::new().with_stream(&url, &body));

        let offers = client.offers(&dest());
        assert!(!offers.supports_streaming());
        assert!(matches!(offers.stream(&PageRequest::new()), Err(TxAsmError::Unsupported(_))));
        assert!(!client.trades(None, None).supports_streaming());
        assert!(!client.assets(None, None).supports_streaming());

        let payments = client.payments(Scope::Account(dest()));
        assert!(payments.supports_streaming());
        let records: Vec<PaymentRecord> = payments
            .stream(&PageRequest::new().cursor("now"))
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].transfer().unwrap().amount.to_string(), "5.0000000");
    }

    #[test]
    fn test_order_book_and_paths_urls() {
        let usd = Asset::credit("USD", ISSUER.parse().unwrap()).unwrap();
        let book_url = format!(
            "{}/order_book?selling_asset_type=native&buying_asset_type=credit_alphanum4&buying_asset_code=USD&buying_asset_issuer={}",
            HORIZON, ISSUER
        );
        let paths_url = format!(
            "{}/paths?source_account={}&destination_account={}&destination_asset_type=credit_alphanum4&destination_asset_code=USD&destination_asset_issuer={}&destination_amount=10.1000000",
            HORIZON, SOURCE, DEST, ISSUER
        );
        let client = client(
            MockTransport::new()
                .with_json(
                    &book_url,
                    json!({
                        "base": {"asset_type": "native"},
                        "counter": {"asset_type": "credit_alphanum4", "asset_code": "USD", "asset_issuer": ISSUER},
                        "bids": [],
                        "asks": [{"price_r": {"n": 2, "d": 1}, "price": "2.0000000", "amount": "10.0000000"}]
                    }),
                )
                .with_json(&paths_url, json!({"_embedded": {"records": []}})),
        );

        let book = client.order_book(&Asset::Native, &usd).unwrap();
        assert_eq!(book.asks.len(), 1);
        let paths = client
            .find_payment_paths(&SOURCE.parse().unwrap(), &dest(), &usd, "10.1".parse().unwrap())
            .unwrap();
        assert!(paths.is_empty());
    }

    #[test]
    fn test_problem_document_on_query() {
        let url = format!("{}/transactions/ff", HORIZON);
        let client = client(MockTransport::new().with_json(&url, json!({"status": 500, "title": "Internal"})));
        assert!(matches!(
            client.transaction("ff"),
            Err(TxAsmError::Horizon { status: 500, .. })
        ));
    }
}
