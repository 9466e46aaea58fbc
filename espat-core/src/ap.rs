use core::net::Ipv4Addr;

use crate::client::AtClient;
use crate::command::descriptor::{CommandKind, CommandResult, Request, Response};
use crate::common::error::{ArgumentError, CommandError};
use crate::common::types::{ApConfiguration, ApIpConfig, MacAddress, Station};

/// Access Point Commands
/// Arguments are checked before anything is queued; an invalid call never
/// reaches the dispatch worker.
///
/// Blocking functions return the typed result once the transaction completed.
/// `*_with` functions return once the request is queued, the callback
/// receives the typed result on the dispatch worker.
#[derive(Clone, Copy)]
pub struct AccessPoint<'e, const N: usize> {
    client: AtClient<'e, N>,
}

impl<'e, const N: usize> AccessPoint<'e, N> {
    /// Create a new AccessPoint
    pub fn new(client: AtClient<'e, N>) -> Self {
        Self { client }
    }

    /// Submit without waiting for the result, converting it for `callback`
    async fn dispatch_typed<O, C, F>(&self, request: Request, convert: C, callback: F)
    where
        C: FnOnce(Response) -> Result<O, CommandError> + Send + 'static,
        F: FnOnce(Result<O, CommandError>) + Send + 'static,
    {
        self.client
            .dispatch(request, move |result: CommandResult| {
                callback(result.and_then(convert))
            })
            .await;
    }

    /* Get AP IP */

    pub async fn get_ip(&self) -> Result<ApIpConfig, CommandError> {
        self.client.execute(Request::ApGetIp).await?.into_ap_ip()
    }

    pub async fn get_ip_with<F>(&self, callback: F) -> Result<(), CommandError>
    where
        F: FnOnce(Result<ApIpConfig, CommandError>) + Send + 'static,
    {
        self.dispatch_typed(Request::ApGetIp, Response::into_ap_ip, callback)
            .await;
        Ok(())
    }

    /* Set AP IP */

    /// Set the AP interface address
    /// `gateway`/`netmask` left as None keep what the device derives from `ip`.
    pub async fn set_ip(
        &self,
        ip: Ipv4Addr,
        gateway: Option<Ipv4Addr>,
        netmask: Option<Ipv4Addr>,
    ) -> Result<(), CommandError> {
        let request = set_ip_request(ip, gateway, netmask)?;
        self.client
            .execute(request)
            .await?
            .into_done(CommandKind::ApSetIp)
    }

    pub async fn set_ip_with<F>(
        &self,
        ip: Ipv4Addr,
        gateway: Option<Ipv4Addr>,
        netmask: Option<Ipv4Addr>,
        callback: F,
    ) -> Result<(), CommandError>
    where
        F: FnOnce(Result<(), CommandError>) + Send + 'static,
    {
        let request = set_ip_request(ip, gateway, netmask)?;
        self.dispatch_typed(request, done(CommandKind::ApSetIp), callback)
            .await;
        Ok(())
    }

    /* Get AP MAC */

    pub async fn get_mac(&self) -> Result<MacAddress, CommandError> {
        self.client.execute(Request::ApGetMac).await?.into_mac()
    }

    pub async fn get_mac_with<F>(&self, callback: F) -> Result<(), CommandError>
    where
        F: FnOnce(Result<MacAddress, CommandError>) + Send + 'static,
    {
        self.dispatch_typed(Request::ApGetMac, Response::into_mac, callback)
            .await;
        Ok(())
    }

    /* Set AP MAC */

    /// Set the AP interface MAC address. Group addresses are refused.
    pub async fn set_mac(&self, mac: MacAddress) -> Result<(), CommandError> {
        let request = set_mac_request(mac)?;
        self.client
            .execute(request)
            .await?
            .into_done(CommandKind::ApSetMac)
    }

    pub async fn set_mac_with<F>(&self, mac: MacAddress, callback: F) -> Result<(), CommandError>
    where
        F: FnOnce(Result<(), CommandError>) + Send + 'static,
    {
        let request = set_mac_request(mac)?;
        self.dispatch_typed(request, done(CommandKind::ApSetMac), callback)
            .await;
        Ok(())
    }

    /* Configure AP */

    /// Apply a SoftAP configuration
    /// The device stores it before answering, see [`crate::constant::COMMAND_TIMEOUT_MS_PERSIST`].
    pub async fn configure(&self, config: &ApConfiguration) -> Result<(), CommandError> {
        config.validate()?;
        self.client
            .execute(Request::ApConfigure(config.clone()))
            .await?
            .into_done(CommandKind::ApConfigure)
    }

    pub async fn configure_with<F>(
        &self,
        config: &ApConfiguration,
        callback: F,
    ) -> Result<(), CommandError>
    where
        F: FnOnce(Result<(), CommandError>) + Send + 'static,
    {
        config.validate()?;
        self.dispatch_typed(
            Request::ApConfigure(config.clone()),
            done(CommandKind::ApConfigure),
            callback,
        )
        .await;
        Ok(())
    }

    /* List Stations */

    /// Fill `stations` with the connected stations
    /// Returns the number of entries written, at most `stations.len()`.
    pub async fn list_stations(&self, stations: &mut [Station]) -> Result<usize, CommandError> {
        let request = list_stations_request(stations.len())?;
        let found = self.client.execute(request).await?.into_stations()?;

        let count = found.len().min(stations.len());
        stations[..count].copy_from_slice(&found[..count]);
        Ok(count)
    }

    /// `callback` receives at most `limit` stations
    pub async fn list_stations_with<F>(&self, limit: usize, callback: F) -> Result<(), CommandError>
    where
        F: FnOnce(Result<alloc::vec::Vec<Station>, CommandError>) + Send + 'static,
    {
        let request = list_stations_request(limit)?;
        self.dispatch_typed(request, Response::into_stations, callback)
            .await;
        Ok(())
    }

    /* Disconnect Station */

    pub async fn disconnect_station(&self, mac: MacAddress) -> Result<(), CommandError> {
        self.client
            .execute(Request::ApDisconnectStation { mac })
            .await?
            .into_done(CommandKind::ApDisconnectStation)
    }

    pub async fn disconnect_station_with<F>(
        &self,
        mac: MacAddress,
        callback: F,
    ) -> Result<(), CommandError>
    where
        F: FnOnce(Result<(), CommandError>) + Send + 'static,
    {
        self.dispatch_typed(
            Request::ApDisconnectStation { mac },
            done(CommandKind::ApDisconnectStation),
            callback,
        )
        .await;
        Ok(())
    }
}

/// Reply conversion for status-only commands
fn done(kind: CommandKind) -> impl FnOnce(Response) -> Result<(), CommandError> + Send + 'static {
    move |response| response.into_done(kind)
}

fn set_ip_request(
    ip: Ipv4Addr,
    gateway: Option<Ipv4Addr>,
    netmask: Option<Ipv4Addr>,
) -> Result<Request, ArgumentError> {
    if ip.is_unspecified() {
        return Err(ArgumentError::MissingIp);
    }
    Ok(Request::ApSetIp {
        ip,
        gateway,
        netmask,
    })
}

fn set_mac_request(mac: MacAddress) -> Result<Request, ArgumentError> {
    if mac.is_group() {
        return Err(ArgumentError::GroupMacAddress);
    }
    Ok(Request::ApSetMac { mac })
}

fn list_stations_request(limit: usize) -> Result<Request, ArgumentError> {
    if limit == 0 {
        return Err(ArgumentError::EmptyStationBuffer);
    }
    Ok(Request::ApListStations { limit })
}
