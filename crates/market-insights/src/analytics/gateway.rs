use std::future::Future;

use super::wire::{RunReportRequest, RunReportResponse};
use super::AnalyticsError;

pub trait AnalyticsGateway: Send + Sync {
    fn run_report(
        &self,
        request: RunReportRequest,
    ) -> impl Future<Output = Result<RunReportResponse, AnalyticsError>> + Send;
}

impl<T> AnalyticsGateway for &T
where
    T: AnalyticsGateway,
{
    fn run_report(
        &self,
        request: RunReportRequest,
    ) -> impl Future<Output = Result<RunReportResponse, AnalyticsError>> + Send {
        (**self).run_report(request)
    }
}

pub trait AnalyticsConnector: Send + Sync + 'static {
    type Gateway: AnalyticsGateway;

    fn connect(&self) -> impl Future<Output = Result<Self::Gateway, AnalyticsError>> + Send;
}
