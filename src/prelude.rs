/*******************************************************************************
 * Copyright (c) 2024 Cénotélie Opérations SAS (cenotelie.fr)
 ******************************************************************************/

//! Prelude for ringlet

pub use crate::broadcast::{BroadcastProducer, BroadcastQueue, BroadcastReceiver, ReaderContext};
pub use crate::channels::{Receiver, Sender, broadcast_channel, work_channel};
pub use crate::errors::{AlreadyAttached, RecvError, SendError, TryRecvError, TrySendError};
pub use crate::wait::WaitStrategy;
pub use crate::work::{WorkConsumer, WorkProducer, WorkQueue};
