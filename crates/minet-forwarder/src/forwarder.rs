//! Forwarder：单线程转发调度循环，拥有 PIT/FIB/CS/StrategyTable/
//! HeapTimer，消费 [`PacketQueue`]，驱动全部收发管线。
//!
//! # 教案式说明
//! - **架构位置 (Where)**：整个引擎唯一一个拥有可变表状态的地方；所有管线
//!   都以该结构体的方法形式存在（设计注记允许的两种建模方式之一：
//!   "methods on a façade object"）。
//! - **并发模型 (How)**：循环跑在宿主分配的专属线程上，`start` 本身是同步
//!   阻塞函数——它不是一个需要被 executor 轮询的 `Future`；校验器那一侧的并
//!   行任务只通过 [`PacketQueue`] 与这里通信，从不直接触碰 PIT/FIB/CS。
//! - **借用形状 (What)**：`pit`/`fib`/`strategy_table`/`faces` 已经是
//!   `DashMap`/`parking_lot::RwLock` 之类的内部可变表，查询/写入都只需要
//!   `&self`。`heap_timer`/`content_store` 照同样的理由包进
//!   `parking_lot::Mutex`——不是因为它们真的会被第二个线程触碰（只有这一个
//!   调度线程调用这些方法），而是让每条管线都能统一用 `&self` 签名：一条管线
//!   经常要一边持有从 `pit.insert`/`pit.find_data_matches` 拿到的条目守卫，
//!   一边调用 `set_expiry_time` 之类的辅助方法——若后者要求 `&mut self`，
//!   守卫对 `self.pit` 的共享借用与该调用所需的独占借用会直接冲突
//!   （E0502）。把所有表都做成内部可变，管线方法就都只需要 `&self`，和
//!   `pit`/`fib` 本来的调用约定一致；真正表示"拥有整条调度循环"的只有
//!   `start`/`step`，它们仍然是 `&mut self`。

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::sync::watch;

use minet_core::{Data, ForwarderConfig, ForwarderError, GpPkt, Interest, LogicFace, Nack, NackHeader, Name};

use crate::core::{FaceRegistry, Fib, HeapTimer, PipelineContext, Pit, PluginManager, StrategyTable};
use crate::core::content_store::ContentStore;
use crate::queue::{IncomingPacketData, MinPacket, PacketQueueReceiver, ReadResult};

/// 构造一对关闭信号通道：宿主保留 `Sender`，在收到 SIGINT/SIGTERM 时调用
/// `send(())`；[`Forwarder::start`] 持有对应的 `Receiver`。
#[must_use]
pub fn shutdown_channel() -> (watch::Sender<()>, watch::Receiver<()>) {
    watch::channel(())
}

pub struct Forwarder {
    config: ForwarderConfig,
    plugin_manager: Arc<dyn PluginManager>,
    pit: Pit,
    fib: Fib,
    content_store: Mutex<ContentStore>,
    strategy_table: StrategyTable,
    heap_timer: Mutex<HeapTimer<Name>>,
    faces: FaceRegistry,
    queue_rx: PacketQueueReceiver,
}

impl Forwarder {
    #[must_use]
    pub fn new(config: ForwarderConfig, plugin_manager: Arc<dyn PluginManager>, queue_rx: PacketQueueReceiver) -> Self {
        let content_store = ContentStore::new(config.table.content_store_capacity);
        Self {
            config,
            plugin_manager,
            pit: Pit::new(),
            fib: Fib::new(),
            content_store: Mutex::new(content_store),
            strategy_table: StrategyTable::new(),
            heap_timer: Mutex::new(HeapTimer::new()),
            faces: FaceRegistry::new(),
            queue_rx,
        }
    }

    #[must_use]
    pub fn fib(&self) -> &Fib {
        &self.fib
    }

    #[must_use]
    pub fn strategy_table(&self) -> &StrategyTable {
        &self.strategy_table
    }

    #[must_use]
    pub fn faces(&self) -> &FaceRegistry {
        &self.faces
    }

    pub fn register_face(&self, face: Arc<dyn LogicFace>) {
        self.faces.register(face);
    }

    #[must_use]
    pub fn pit_len(&self) -> usize {
        self.pit.len()
    }

    #[must_use]
    pub fn content_store_len(&self) -> usize {
        self.content_store.lock().len()
    }

    fn pipeline_context(&self) -> PipelineContext<'_> {
        PipelineContext {
            fib: &self.fib,
            faces: &self.faces,
            plugin: self.plugin_manager.as_ref(),
        }
    }

    /// 调度循环。阻塞直至关闭信号或队列断开；返回 `(原因字符串, 可选错误)`——
    /// 除 panic 外的所有退出路径第二个字段都是 `None`。
    pub fn start(&mut self, mut shutdown_rx: watch::Receiver<()>) -> (String, Option<ForwarderError>) {
        tracing::info!("forwarder starting");
        loop {
            if let Some(outcome) = self.step(Duration::from_millis(1)) {
                return outcome;
            }

            match shutdown_rx.has_changed() {
                Ok(true) | Err(_) => {
                    tracing::info!("shutdown requested");
                    return ("shutdown requested".to_owned(), None);
                }
                Ok(false) => {}
            }
        }
    }

    /// 运行一次循环体：drain 到期定时器、尝试读取并派发一个报文、再次 drain。
    /// 返回 `Some(reason, error)` 表示循环应当终止（panic 或队列断开）；
    /// `None` 表示这次迭代正常完成（无论是否真的处理了一个报文）。
    ///
    /// 独立于 [`Forwarder::start`] 暴露出来，供宿主做单步驱动，也方便不依赖
    /// 独立线程的测试逐步验证管线状态。
    pub fn step(&mut self, poll_timeout: Duration) -> Option<(String, Option<ForwarderError>)> {
        self.drain_due_timers();

        match self.queue_rx.read_until(poll_timeout) {
            ReadResult::Packet(incoming) => {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.dispatch(incoming)));
                if let Err(payload) = outcome {
                    let detail = panic_message(&payload);
                    tracing::error!(detail = %detail, "forwarder pipeline panicked");
                    return Some(("crashed".to_owned(), Some(ForwarderError::PipelinePanicked { detail })));
                }
                // Drain again so a set_expiry_time(entry, 0) issued by the
                // pipeline we just ran finalizes within this same loop iteration,
                // without re-entering PIT locks from inside the pipeline call itself.
                self.drain_due_timers();
                None
            }
            ReadResult::Timeout => None,
            ReadResult::Disconnected => {
                tracing::info!("packet queue disconnected, shutting down");
                Some(("queue closed".to_owned(), None))
            }
        }
    }

    fn drain_due_timers(&self) {
        let due = self.heap_timer.lock().drain_due(Instant::now());
        for name in due {
            self.on_interest_finalize(&name);
        }
    }

    fn set_expiry_time(&self, name: &Name, duration: Duration) {
        self.heap_timer.lock().add(duration, name.clone());
    }

    fn dispatch(&self, incoming: IncomingPacketData) {
        let face = incoming.face;
        match incoming.packet {
            MinPacket::GpPkt(packet) => self.on_incoming_gppkt(face, packet),
            MinPacket::Data(data) => self.on_incoming_data(face, data),
            MinPacket::Nack(nack) => self.on_incoming_nack(face, nack),
            MinPacket::Interest(interest) => {
                if interest.is_nack_carrier() {
                    let reason = interest
                        .nack_header
                        .as_ref()
                        .map(|h| h.reason)
                        .unwrap_or(minet_core::NackReason::Duplicate);
                    self.on_incoming_nack(face, Nack { interest, reason });
                } else {
                    self.on_incoming_interest(face, interest);
                }
            }
        }
    }

    // ---- Incoming Interest ----------------------------------------------

    fn on_incoming_interest(&self, ingress: u64, mut interest: Interest) {
        if self.plugin_manager.before_incoming_interest(ingress, &interest).is_abort() {
            return;
        }
        if interest.ttl == 0 {
            self.on_interest_loop(ingress, &interest);
            return;
        }
        interest.ttl -= 1;

        let mut entry = self.pit.insert(&interest.name);

        if entry.classify_duplicate_nonce(ingress, interest.nonce) == crate::core::DuplicateNonce::InOther {
            drop(entry);
            self.on_interest_loop(ingress, &interest);
            return;
        }

        interest.incoming_face_id = Some(ingress);

        // known gap: a second consumer joins the already-outstanding fetch here
        // unconditionally, even under must_be_fresh — it never re-checks the
        // content store just because a sibling consumer arrived later.
        if entry.has_pending_consumer() {
            self.on_content_store_miss(ingress, &mut entry, &interest);
            return;
        }

        let cached = self.content_store.lock().find(&interest.name, interest.must_be_fresh).cloned();
        match cached {
            Some(data) => self.on_content_store_hit(ingress, &mut entry, &data),
            None => self.on_content_store_miss(ingress, &mut entry, &interest),
        }
    }

    // ---- Interest Loop -----------------------------------------------------

    fn on_interest_loop(&self, ingress: u64, interest: &Interest) {
        if self.plugin_manager.before_interest_loop(ingress, interest).is_abort() {
            return;
        }
        let nack = Nack { interest: interest.clone(), reason: minet_core::NackReason::Duplicate };
        if let Some(face) = self.faces.get(ingress) {
            face.send_nack(&nack);
        } else {
            tracing::warn!(ingress, "interest loop: no registered face to nack on");
        }
    }

    // ---- Content Store Miss --------------------------------------------------

    fn on_content_store_miss(&self, ingress: u64, entry: &mut crate::core::PitEntry, interest: &Interest) {
        if self.plugin_manager.before_content_store_miss(ingress, entry).is_abort() {
            return;
        }
        let now = Instant::now();
        let expire_time = now + Duration::from_millis(interest.effective_lifetime_ms() as u64);
        entry.in_records.insert(
            ingress,
            crate::core::InRecord {
                face: ingress,
                last_nonce: interest.nonce,
                last_interest: interest.clone(),
                expire_time,
            },
        );

        let deadline = entry.max_in_record_expiry().unwrap_or(now);
        let duration = deadline.saturating_duration_since(now);
        self.set_expiry_time(&entry.name, duration);

        match self.strategy_table.longest_prefix(&interest.name) {
            Some(strategy) => {
                let ctx = self.pipeline_context();
                strategy.after_receive_interest(&ctx, entry, interest, ingress);
            }
            None => tracing::error!(name = %interest.name, "no strategy matches, interest dropped"),
        }
    }

    // ---- Content Store Hit ----------------------------------------------------

    fn on_content_store_hit(&self, ingress: u64, entry: &mut crate::core::PitEntry, data: &Data) {
        if self.plugin_manager.before_content_store_hit(ingress, entry).is_abort() {
            return;
        }
        self.set_expiry_time(&entry.name, Duration::ZERO);

        match self.strategy_table.longest_prefix(&entry.name) {
            Some(strategy) => {
                let ctx = self.pipeline_context();
                strategy.after_content_store_hit(&ctx, entry, data, ingress);
            }
            None => tracing::error!(name = %entry.name, "no strategy matches, cached data dropped"),
        }
    }

    // ---- Interest Finalize ----------------------------------------------------

    fn on_interest_finalize(&self, name: &Name) {
        let Some(entry_ref) = self.pit.get(name) else {
            return;
        };
        if self.plugin_manager.before_interest_finalize(&entry_ref).is_abort() {
            return;
        }
        if entry_ref.deleted {
            return;
        }
        drop(entry_ref);
        self.pit.finalize(name);
    }

    // ---- Incoming Data --------------------------------------------------------

    fn on_incoming_data(&self, ingress: u64, mut data: Data) {
        if self.plugin_manager.before_incoming_data(ingress, &data).is_abort() {
            return;
        }
        if data.ttl == 0 {
            tracing::debug!(name = %data.name, "incoming data dropped: ttl expired");
            return;
        }
        data.ttl -= 1;

        let Some(mut entry) = self.pit.find_data_matches(&data.name) else {
            self.on_data_unsolicited(ingress, data);
            return;
        };

        self.set_expiry_time(&entry.name, Duration::ZERO);

        if !data.no_cache {
            self.content_store.lock().insert(data.clone());
        }

        match self.strategy_table.longest_prefix(&data.name) {
            Some(strategy) => {
                let ctx = self.pipeline_context();
                strategy.after_receive_data(&ctx, &mut entry, &data, ingress);
                // known gap: only the success path marks satisfied and removes
                // the ingress out-record (open question 4) — when no strategy
                // matches, the mutations above stand and the entry times out.
                entry.satisfied = true;
                entry.out_records.remove(&ingress);
            }
            None => tracing::error!(name = %data.name, "no strategy matches, data left unsatisfied to time out"),
        }
    }

    // ---- Data Unsolicited -----------------------------------------------------

    fn on_data_unsolicited(&self, ingress: u64, data: Data) {
        if self.plugin_manager.before_data_unsolicited(ingress, &data).is_abort() {
            return;
        }
        if self.config.table.cache_unsolicited_data {
            self.content_store.lock().insert(data);
        } else {
            tracing::debug!(ingress, "unsolicited data dropped (cache_unsolicited_data=false)");
        }
    }

    // ---- Incoming Nack --------------------------------------------------------

    fn on_incoming_nack(&self, ingress: u64, nack: Nack) {
        if self.plugin_manager.before_incoming_nack(ingress, &nack).is_abort() {
            return;
        }
        let Some(mut entry) = self.pit.find_data_matches(&nack.interest.name) else {
            tracing::debug!(name = %nack.interest.name, "incoming nack dropped: no PIT entry");
            return;
        };

        let should_finalize = {
            let Some(out) = entry.out_records.get_mut(&ingress) else {
                tracing::debug!(ingress, "incoming nack dropped: no out-record");
                return;
            };
            if out.last_nonce != nack.interest.nonce {
                tracing::debug!(ingress, "incoming nack dropped: nonce mismatch (stale)");
                return;
            }
            out.nack_header = Some(NackHeader { reason: nack.reason });

            let now = Instant::now();
            entry
                .out_records
                .values()
                .all(|r| r.expire_time <= now || r.nack_header.is_some())
        };

        if should_finalize {
            self.set_expiry_time(&entry.name, Duration::ZERO);
        }

        match self.strategy_table.longest_prefix(&nack.interest.name) {
            Some(strategy) => {
                let ctx = self.pipeline_context();
                strategy.after_receive_nack(&ctx, &mut entry, &nack, ingress);
            }
            None => tracing::error!(name = %nack.interest.name, "no strategy matches, nack dropped"),
        }
    }

    // ---- Incoming GPPkt -------------------------------------------------------

    fn on_incoming_gppkt(&self, ingress: u64, mut packet: GpPkt) {
        if self.plugin_manager.before_incoming_gppkt(ingress, &packet).is_abort() {
            return;
        }
        if packet.ttl == 0 {
            tracing::debug!(dst = %packet.dst_identifier, "gppkt dropped: ttl expired");
            return;
        }
        packet.ttl -= 1;

        match self.strategy_table.longest_prefix(&packet.dst_identifier) {
            Some(strategy) => {
                let ctx = self.pipeline_context();
                strategy.after_receive_gppkt(&ctx, &packet, ingress);
            }
            None => tracing::error!(dst = %packet.dst_identifier, "no strategy matches, gppkt dropped"),
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}
